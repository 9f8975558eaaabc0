mod document;
mod fields;
mod identity;
mod records;
mod rules;
mod run;
mod sink;

pub use run::run;
pub(crate) use document::load_document;
pub(crate) use fields::clean_text;

use document::*;
use fields::*;
use identity::*;
use records::*;
use rules::*;
use sink::*;

const DB_SCHEMA_VERSION: &str = "0.1.0";
pub(crate) const LATEST_CONVERT_MANIFEST: &str = "convert_latest.json";
const BRAND_HEADER_PREFIX: &str = "Marca:";
const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';
/// Hex characters kept from the SHA-256 of the composite key (64 bits).
const ID_HEX_LEN: usize = 16;

const MIN_COLUMNS: usize = 10;
const COL_MODEL: usize = 0;
const COL_START_YEAR: usize = 1;
const COL_END_YEAR: usize = 2;
const COL_CC: usize = 3;
const COL_CYLINDERS: usize = 4;
const COL_FUEL_TYPE: usize = 5;
const COL_KW: usize = 6;
const COL_CVF: usize = 7;
const COL_CV: usize = 8;
const COL_VALUE: usize = 9;
