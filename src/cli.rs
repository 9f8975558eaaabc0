use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "vehicle-fiscal",
    version,
    about = "Extract, normalize and identify vehicle fiscal values from the official gazette tables"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Convert(ConvertArgs),
    Analyze(AnalyzeArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(long, default_value = ".cache/vehicle-fiscal")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "assets/boe_2026.xml")]
    pub source: PathBuf,

    #[arg(long, default_value = "data/boe_prices.json")]
    pub output: PathBuf,

    /// Secondary JSON destinations, skipped with a warning when their directory is missing.
    #[arg(long = "mirror-path")]
    pub mirror_paths: Vec<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// JSON rule file extending the built-in brand rule table.
    #[arg(long)]
    pub rules_path: Option<PathBuf>,

    #[arg(long, default_value_t = 3)]
    pub sample_count: usize,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(long, default_value = ".cache/vehicle-fiscal")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "data/boe_prices.json")]
    pub records_path: PathBuf,

    /// Analyze the raw model strings of a source document instead of an emitted record file.
    #[arg(long, conflicts_with = "records_path")]
    pub source: Option<PathBuf>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = 5)]
    pub max_groups_per_brand: usize,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/vehicle-fiscal")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
