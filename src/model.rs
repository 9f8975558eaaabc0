use serde::{Deserialize, Serialize};

/// One emitted vehicle fiscal entry. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub start_year: String,
    pub end_year: Option<String>,
    pub cc: String,
    pub cylinders: String,
    pub fuel_type: String,
    pub kw: String,
    pub cvf: String,
    pub cv: i64,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertPaths {
    pub source_path: String,
    pub output_path: String,
    pub mirror_paths: Vec<String>,
    pub db_path: Option<String>,
    pub rules_path: Option<String>,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertCounts {
    pub tables_seen: usize,
    pub non_brand_tables: usize,
    pub brands_processed: usize,
    pub rows_seen: usize,
    pub records_built: usize,
    pub records_emitted: usize,
    pub rows_skipped: usize,
    pub skipped_missing_columns: usize,
    pub skipped_unparseable_value: usize,
    pub duplicates_merged: usize,
    pub identity_collisions: usize,
    pub mirrors_written: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandSummary {
    pub brand: String,
    pub rows: usize,
    pub records: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityCollision {
    pub id: String,
    pub composite_key: String,
    pub previous: VehicleRecord,
    pub replacement: VehicleRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub paths: ConvertPaths,
    pub source_sha256: String,
    pub counts: ConvertCounts,
    pub brands: Vec<BrandSummary>,
    pub collisions: Vec<IdentityCollision>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}

/// Read-side view of a convert manifest; only the fields `status` reports.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertRunSnapshot {
    pub run_id: Option<String>,
    pub status: Option<String>,
    pub updated_at: Option<String>,
    pub source_sha256: Option<String>,
    #[serde(default)]
    pub counts: ConvertCounts,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconsistencyGroup {
    pub normalized_key: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandInconsistencies {
    pub brand: String,
    pub groups: Vec<InconsistencyGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InconsistencyReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub input_path: String,
    pub input_kind: String,
    pub model_count: usize,
    pub brand_count: usize,
    pub group_count: usize,
    pub brands: Vec<BrandInconsistencies>,
}
