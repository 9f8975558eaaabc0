use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::*;
use crate::cli::AnalyzeArgs;
use crate::commands::convert::{clean_text, load_document};
use crate::model::{InconsistencyReport, VehicleRecord};
use crate::util::{now_utc_string, read_json, write_json_pretty};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let (input_path, input_kind, models) = match &args.source {
        Some(source) => (source, "raw_extraction", raw_extraction_models(source)?),
        None => (
            &args.records_path,
            "records",
            record_models(&args.records_path)?,
        ),
    };

    info!(
        input = %input_path.display(),
        kind = input_kind,
        models = models.len(),
        "analyzing model naming"
    );

    let report = build_report(
        &input_path.display().to_string(),
        input_kind,
        &models,
    );
    log_report(&report, args.max_groups_per_brand);

    let report_path = args
        .report_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("manifests").join(REPORT_FILENAME));
    write_json_pretty(&report_path, &report)?;
    info!(path = %report_path.display(), "wrote inconsistency report");

    Ok(())
}

pub(crate) fn record_models(path: &Path) -> Result<Vec<(String, String)>> {
    let records: Vec<VehicleRecord> = read_json(path)?;
    Ok(records
        .into_iter()
        .map(|record| (record.brand, record.model))
        .collect())
}

/// Model cells as they appear in the document, whitespace-cleaned but not rule-normalized.
pub(crate) fn raw_extraction_models(source: &Path) -> Result<Vec<(String, String)>> {
    let document = load_document(source)?;
    Ok(document
        .tables
        .into_iter()
        .flat_map(|table| {
            let brand = table.brand;
            table
                .rows
                .into_iter()
                .filter_map(|row| row.first().map(|cell| clean_text(cell)))
                .filter(|model| !model.is_empty())
                .map(move |model| (brand.clone(), model))
                .collect::<Vec<(String, String)>>()
        })
        .collect())
}

pub(crate) fn build_report(
    input_path: &str,
    input_kind: &str,
    models: &[(String, String)],
) -> InconsistencyReport {
    let brands = detect_inconsistencies(
        models
            .iter()
            .map(|(brand, model)| (brand.as_str(), model.as_str())),
    );
    let brand_count = models
        .iter()
        .map(|(brand, _)| brand.as_str())
        .collect::<BTreeSet<&str>>()
        .len();

    InconsistencyReport {
        manifest_version: 1,
        generated_at: now_utc_string(),
        input_path: input_path.to_string(),
        input_kind: input_kind.to_string(),
        model_count: models.len(),
        brand_count,
        group_count: brands.iter().map(|brand| brand.groups.len()).sum(),
        brands,
    }
}

fn log_report(report: &InconsistencyReport, max_groups_per_brand: usize) {
    for brand in &report.brands {
        info!(
            brand = %brand.brand,
            groups = brand.groups.len(),
            "inconsistent model naming"
        );
        for group in brand.groups.iter().take(max_groups_per_brand) {
            info!(brand = %brand.brand, variation = ?group.members, "variation");
        }
        if brand.groups.len() > max_groups_per_brand {
            info!(
                brand = %brand.brand,
                "... and {} more sets",
                brand.groups.len() - max_groups_per_brand
            );
        }
    }

    info!(
        models = report.model_count,
        brands = report.brand_count,
        groups = report.group_count,
        "analysis complete"
    );
}
