use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use scraper::{ElementRef, Html, Selector};

use super::{BRAND_HEADER_PREFIX, clean_text, element_text};

/// One brand-grouped table: the brand from the header, raw rows from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BrandTable {
    pub brand: String,
    pub rows: Vec<RawRow>,
}

/// Raw cell texts of one body row, in column order.
pub(crate) type RawRow = Vec<String>;

#[derive(Debug, Default)]
pub(crate) struct ExtractedDocument {
    pub tables: Vec<BrandTable>,
    pub tables_seen: usize,
    pub non_brand_tables: usize,
    pub warnings: Vec<String>,
}

struct DocumentSelectors {
    table: Selector,
    brand_header: Selector,
    body_row: Selector,
    cell: Selector,
}

impl DocumentSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            table: compile_selector("table.tabla_ancha")?,
            brand_header: compile_selector("thead tr th.cabeza_tabla")?,
            body_row: compile_selector("tbody tr")?,
            cell: compile_selector("td")?,
        })
    }
}

fn compile_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("failed to compile selector {css}: {err:?}"))
}

pub(crate) fn load_document(path: &Path) -> Result<ExtractedDocument> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let markup = String::from_utf8(raw)
        .with_context(|| format!("source document is not valid UTF-8: {}", path.display()))?;

    let extracted = extract_brand_tables(&markup)?;
    if extracted.tables.is_empty() {
        bail!(
            "no brand tables found in {} ({} tables inspected)",
            path.display(),
            extracted.tables_seen
        );
    }

    Ok(extracted)
}

pub(crate) fn extract_brand_tables(markup: &str) -> Result<ExtractedDocument> {
    let selectors = DocumentSelectors::new()?;
    let document = Html::parse_document(markup);
    let mut extracted = ExtractedDocument::default();

    for table in document.select(&selectors.table) {
        extracted.tables_seen += 1;

        let Some(brand) = read_brand_header(table, &selectors) else {
            extracted.non_brand_tables += 1;
            continue;
        };

        if brand.is_empty() {
            extracted.warnings.push(format!(
                "table {} has an empty brand header; skipped",
                extracted.tables_seen
            ));
            continue;
        }

        let rows = table
            .select(&selectors.body_row)
            .map(|row| {
                row.select(&selectors.cell)
                    .map(element_text)
                    .collect::<RawRow>()
            })
            .collect::<Vec<RawRow>>();

        extracted.tables.push(BrandTable { brand, rows });
    }

    Ok(extracted)
}

fn read_brand_header(table: ElementRef<'_>, selectors: &DocumentSelectors) -> Option<String> {
    let header = table.select(&selectors.brand_header).next()?;
    let text = clean_text(&element_text(header));
    let brand = text.strip_prefix(BRAND_HEADER_PREFIX)?;
    Some(brand.trim().to_string())
}
