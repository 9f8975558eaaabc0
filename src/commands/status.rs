use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::analyze::REPORT_FILENAME;
use crate::commands::convert::LATEST_CONVERT_MANIFEST;
use crate::model::{ConvertRunSnapshot, InconsistencyReport};
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let convert_manifest_path = manifest_dir.join(LATEST_CONVERT_MANIFEST);
    let report_path = manifest_dir.join(REPORT_FILENAME);

    info!(cache_root = %args.cache_root.display(), "status requested");

    if convert_manifest_path.exists() {
        let snapshot: ConvertRunSnapshot = read_json(&convert_manifest_path)?;
        let counts = &snapshot.counts;

        info!(
            run_id = %snapshot.run_id.clone().unwrap_or_default(),
            status = %snapshot.status.clone().unwrap_or_default(),
            updated_at = %snapshot.updated_at.clone().unwrap_or_default(),
            source_sha256 = %snapshot.source_sha256.clone().unwrap_or_default(),
            brands = counts.brands_processed,
            records = counts.records_emitted,
            rows_skipped = counts.rows_skipped,
            skipped_missing_columns = counts.skipped_missing_columns,
            skipped_unparseable_value = counts.skipped_unparseable_value,
            duplicates_merged = counts.duplicates_merged,
            collisions = counts.identity_collisions,
            warnings = snapshot.warnings.len(),
            "loaded last convert manifest"
        );
    } else {
        warn!(path = %convert_manifest_path.display(), "convert manifest missing");
    }

    if report_path.exists() {
        let report: InconsistencyReport = read_json(&report_path)?;
        info!(
            generated_at = %report.generated_at,
            input = %report.input_path,
            kind = %report.input_kind,
            groups = report.group_count,
            brands_with_groups = report.brands.len(),
            "loaded inconsistency report"
        );
    } else {
        warn!(path = %report_path.display(), "inconsistency report missing");
    }

    if let Some(db_path) = &args.db_path {
        report_store(db_path)?;
    }

    Ok(())
}

fn report_store(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing");
        return Ok(());
    }

    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    let vehicles = query_count(&conn, "SELECT COUNT(*) FROM vehicles").unwrap_or(0);
    let brands = query_count(&conn, "SELECT COUNT(DISTINCT brand) FROM vehicles").unwrap_or(0);
    let run_id = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'run_id' LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        )
        .unwrap_or_default();

    info!(
        path = %db_path.display(),
        vehicles,
        brands,
        run_id = %run_id,
        "database status"
    );

    Ok(())
}

fn query_count(conn: &Connection, sql: &str) -> Result<i64> {
    let count = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
