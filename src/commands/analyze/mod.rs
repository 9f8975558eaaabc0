mod detect;
mod run;

pub use run::run;

use detect::*;

pub(crate) const REPORT_FILENAME: &str = "inconsistency_report.json";
