use std::collections::BTreeSet;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use super::*;
use crate::cli::ConvertArgs;
use crate::model::{
    BrandSummary, ConvertCounts, ConvertPaths, ConvertRunManifest, IdentityCollision,
    VehicleRecord,
};
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

pub fn run(args: ConvertArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let manifest_dir = args.cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;
    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "convert_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let latest_manifest_path = manifest_dir.join(LATEST_CONVERT_MANIFEST);

    info!(source = %args.source.display(), run_id = %run_id, "starting convert");

    let rules = BrandRuleTable::load(args.rules_path.as_deref())?;
    info!(
        brands = rules.brand_count(),
        rules = rules.rule_count(),
        "loaded brand rule table"
    );

    let source_sha256 = sha256_file(&args.source)?;
    let document = load_document(&args.source)?;
    info!(
        tables = document.tables_seen,
        brand_tables = document.tables.len(),
        "parsed source document"
    );

    let mut conversion = convert_tables(&document.tables, &rules);
    conversion.counts.tables_seen = document.tables_seen;
    conversion.counts.non_brand_tables = document.non_brand_tables;

    let mut warnings = document.warnings;
    warnings.extend(conversion.collisions.iter().map(describe_collision));

    write_primary(&args.output, &conversion.records)?;
    conversion.counts.mirrors_written =
        write_mirrors(&args.mirror_paths, &conversion.records, &mut warnings);

    if let Some(db_path) = &args.db_path {
        if let Err(err) = write_store(db_path, &conversion.records, &run_id, &source_sha256) {
            warn!(path = %db_path.display(), error = %err, "sqlite store unavailable");
            warnings.push(format!(
                "sqlite store {} not updated: {err:#}",
                db_path.display()
            ));
        }
    }

    let manifest = ConvertRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: if warnings.is_empty() {
            "completed"
        } else {
            "completed_with_warnings"
        }
        .to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_convert_command(&args),
        paths: ConvertPaths {
            source_path: args.source.display().to_string(),
            output_path: args.output.display().to_string(),
            mirror_paths: args
                .mirror_paths
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            db_path: args.db_path.as_ref().map(|path| path.display().to_string()),
            rules_path: args
                .rules_path
                .as_ref()
                .map(|path| path.display().to_string()),
            manifest_path: manifest_path.display().to_string(),
        },
        source_sha256,
        counts: conversion.counts.clone(),
        brands: conversion.brands,
        collisions: conversion.collisions,
        warnings,
        notes: vec![
            "Record ids hash brand, model, start year, end year, cv and value; cc, cylinders, fuel type, kw and cvf are not part of the identity."
                .to_string(),
        ],
    };

    write_json_pretty(&manifest_path, &manifest)?;
    write_json_pretty(&latest_manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote convert run manifest");

    for record in conversion.records.iter().take(args.sample_count) {
        info!(
            id = %record.id,
            brand = %record.brand,
            model = %record.model,
            cv = record.cv,
            value = record.value,
            "sample record"
        );
    }

    let counts = &manifest.counts;
    info!(
        brands = counts.brands_processed,
        records = counts.records_emitted,
        skipped = counts.rows_skipped,
        collisions = counts.identity_collisions,
        "convert completed"
    );

    Ok(())
}

/// Everything between the parsed tables and the sinks.
#[derive(Debug, Default)]
pub(crate) struct Conversion {
    pub records: Vec<VehicleRecord>,
    pub collisions: Vec<IdentityCollision>,
    pub brands: Vec<BrandSummary>,
    pub counts: ConvertCounts,
}

pub(crate) fn convert_tables(tables: &[BrandTable], rules: &BrandRuleTable) -> Conversion {
    let mut assigner = IdentityAssigner::new();
    let mut counts = ConvertCounts::default();
    let mut brands = Vec::with_capacity(tables.len());
    let mut distinct_brands = BTreeSet::<&str>::new();

    for table in tables {
        let build = build_table(table, rules);
        distinct_brands.insert(table.brand.as_str());

        counts.rows_seen += table.rows.len();
        counts.records_built += build.drafts.len();
        counts.rows_skipped += build.skipped.len();
        for reason in &build.skipped {
            match reason {
                SkipReason::MissingColumns { .. } => counts.skipped_missing_columns += 1,
                SkipReason::UnparseableValue { .. } => counts.skipped_unparseable_value += 1,
            }
        }

        info!(
            brand = %build.brand,
            records = build.drafts.len(),
            skipped = build.skipped.len(),
            "processed brand table"
        );
        brands.push(BrandSummary {
            brand: build.brand,
            rows: table.rows.len(),
            records: build.drafts.len(),
            skipped: build.skipped.len(),
        });

        for draft in build.drafts {
            assigner.insert(draft);
        }
    }

    let outcome = assigner.finish();
    counts.brands_processed = distinct_brands.len();
    counts.records_emitted = outcome.records.len();
    counts.duplicates_merged = outcome.duplicates_merged;
    counts.identity_collisions = outcome.collisions.len();

    Conversion {
        records: outcome.records,
        collisions: outcome.collisions,
        brands,
        counts,
    }
}

pub(crate) fn describe_collision(collision: &IdentityCollision) -> String {
    let describe = |record: &VehicleRecord| {
        format!(
            "{} cc, {} cyl, {}, {} kW, cvf {}",
            record.cc, record.cylinders, record.fuel_type, record.kw, record.cvf
        )
    };
    format!(
        "identity collision {}: {} {} ({}) replaced by ({})",
        collision.id,
        collision.replacement.brand,
        collision.replacement.model,
        describe(&collision.previous),
        describe(&collision.replacement)
    )
}

pub(crate) fn render_convert_command(args: &ConvertArgs) -> String {
    let mut command = vec![
        "vehicle-fiscal".to_string(),
        "convert".to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
        "--source".to_string(),
        args.source.display().to_string(),
        "--output".to_string(),
        args.output.display().to_string(),
    ];

    for path in &args.mirror_paths {
        command.push("--mirror-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.db_path {
        command.push("--db-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.rules_path {
        command.push("--rules-path".to_string());
        command.push(path.display().to_string());
    }
    command.push("--sample-count".to_string());
    command.push(args.sample_count.to_string());

    command.join(" ")
}
