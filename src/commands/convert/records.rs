use std::fmt;

use tracing::debug;

use super::*;

/// A normalized record before identity assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VehicleDraft {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SkipReason {
    MissingColumns { found: usize },
    UnparseableValue { raw: String },
}

impl SkipReason {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingColumns { .. } => "missing_columns",
            SkipReason::UnparseableValue { .. } => "unparseable_value",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingColumns { found } => {
                write!(f, "row has {found} columns, expected at least {MIN_COLUMNS}")
            }
            SkipReason::UnparseableValue { raw } => {
                write!(f, "fiscal value '{raw}' is not a number")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TableBuild {
    pub brand: String,
    pub drafts: Vec<VehicleDraft>,
    pub skipped: Vec<SkipReason>,
}

pub(crate) fn build_record(
    brand: &str,
    row: &[String],
    rules: &BrandRuleTable,
) -> Result<VehicleDraft, SkipReason> {
    if row.len() < MIN_COLUMNS {
        return Err(SkipReason::MissingColumns { found: row.len() });
    }

    let cell = |index: usize| clean_text(&row[index]);

    let raw_value = cell(COL_VALUE);
    let Some(value) = parse_fiscal_value(&raw_value) else {
        return Err(SkipReason::UnparseableValue { raw: raw_value });
    };

    let brand = brand.trim().to_string();
    let model = rules.normalize_model(&brand, &row[COL_MODEL]);
    let end_year = Some(cell(COL_END_YEAR)).filter(|value| !value.is_empty());

    Ok(VehicleDraft {
        model,
        start_year: cell(COL_START_YEAR),
        end_year,
        cc: cell(COL_CC),
        cylinders: cell(COL_CYLINDERS),
        fuel_type: cell(COL_FUEL_TYPE),
        kw: cell(COL_KW),
        cvf: cell(COL_CVF),
        cv: parse_power(&cell(COL_CV)),
        value,
        brand,
    })
}

/// Builds every row of one table. A skipped row never stops the rest.
pub(crate) fn build_table(table: &BrandTable, rules: &BrandRuleTable) -> TableBuild {
    let mut build = TableBuild {
        brand: table.brand.clone(),
        ..TableBuild::default()
    };

    for (row_index, row) in table.rows.iter().enumerate() {
        match build_record(&table.brand, row, rules) {
            Ok(draft) => build.drafts.push(draft),
            Err(reason) => {
                debug!(
                    brand = %table.brand,
                    row = row_index,
                    reason = reason.as_str(),
                    detail = %reason,
                    "skipped row"
                );
                build.skipped.push(reason);
            }
        }
    }

    build
}
