use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::{info, warn};

use super::DB_SCHEMA_VERSION;
use crate::model::VehicleRecord;
use crate::util::{write_json_file, write_json_pretty};

pub(crate) fn write_primary(path: &Path, records: &[VehicleRecord]) -> Result<()> {
    write_json_pretty(path, &records)?;
    info!(path = %path.display(), records = records.len(), "wrote record file");
    Ok(())
}

/// Secondary JSON copies. A missing directory or failed write is a warning, never fatal.
pub(crate) fn write_mirrors(
    paths: &[PathBuf],
    records: &[VehicleRecord],
    warnings: &mut Vec<String>,
) -> usize {
    let mut written = 0usize;

    for path in paths {
        let parent_exists = path
            .parent()
            .map(|parent| parent.as_os_str().is_empty() || parent.is_dir())
            .unwrap_or(false);
        if !parent_exists {
            let message = format!(
                "mirror destination directory missing, skipped: {}",
                path.display()
            );
            warn!(path = %path.display(), "mirror destination directory missing");
            warnings.push(message);
            continue;
        }

        match write_json_file(path, &records) {
            Ok(()) => {
                info!(path = %path.display(), "wrote mirror record file");
                written += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to write mirror");
                warnings.push(format!("failed to write mirror {}: {err:#}", path.display()));
            }
        }
    }

    written
}

pub(crate) fn write_store(
    db_path: &Path,
    records: &[VehicleRecord],
    run_id: &str,
    source_sha256: &str,
) -> Result<usize> {
    let mut connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    let inserted = replace_vehicles(&mut connection, records)?;
    write_metadata(&connection, run_id, source_sha256)?;

    info!(path = %db_path.display(), vehicles = inserted, "updated sqlite store");
    Ok(inserted)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub(crate) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS vehicles (
              id TEXT PRIMARY KEY,
              seq INTEGER NOT NULL,
              brand TEXT NOT NULL,
              model TEXT NOT NULL,
              start_year TEXT NOT NULL,
              end_year TEXT,
              cc TEXT NOT NULL,
              cylinders TEXT NOT NULL,
              fuel_type TEXT NOT NULL,
              kw TEXT NOT NULL,
              cvf TEXT NOT NULL,
              cv INTEGER NOT NULL,
              value INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_vehicles_brand_model ON vehicles(brand, model);
            ",
        )
        .context("failed to create sqlite schema")?;
    Ok(())
}

pub(crate) fn replace_vehicles(
    connection: &mut Connection,
    records: &[VehicleRecord],
) -> Result<usize> {
    let tx = connection
        .transaction()
        .context("failed to start vehicles transaction")?;
    tx.execute("DELETE FROM vehicles", [])
        .context("failed to clear vehicles")?;

    {
        let mut statement = tx
            .prepare(
                "
                INSERT OR REPLACE INTO vehicles (
                  id, seq, brand, model, start_year, end_year, cc, cylinders,
                  fuel_type, kw, cvf, cv, value
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ",
            )
            .context("failed to prepare vehicle insert")?;

        for (seq, record) in records.iter().enumerate() {
            statement
                .execute(params![
                    record.id,
                    seq as i64,
                    record.brand,
                    record.model,
                    record.start_year,
                    record.end_year,
                    record.cc,
                    record.cylinders,
                    record.fuel_type,
                    record.kw,
                    record.cvf,
                    record.cv,
                    record.value,
                ])
                .with_context(|| format!("failed to insert vehicle {}", record.id))?;
        }
    }

    tx.commit().context("failed to commit vehicles")?;
    Ok(records.len())
}

fn write_metadata(connection: &Connection, run_id: &str, source_sha256: &str) -> Result<()> {
    for (key, value) in [
        ("db_schema_version", DB_SCHEMA_VERSION),
        ("run_id", run_id),
        ("source_sha256", source_sha256),
    ] {
        connection
            .execute(
                "INSERT INTO metadata (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("failed to write metadata key {key}"))?;
    }
    Ok(())
}
