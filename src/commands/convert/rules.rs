use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::clean_text;
use crate::util::read_json;

/// Brand-scoped model fixes, applied in order. Each entry is `(from, to)`, a literal
/// substring replacement.
const BRAND_RULES: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "BMW",
        "drop hyphen between series letter and digit",
        &[
            ("M-2", "M2"),
            ("M-3", "M3"),
            ("M-4", "M4"),
            ("M-5", "M5"),
            ("M-6", "M6"),
            ("M-8", "M8"),
            ("Z-4", "Z4"),
        ],
    ),
    (
        "TOYOTA",
        "RAV4 and D-4D spelling",
        &[
            ("RAV-4", "RAV4"),
            ("RAV 4", "RAV4"),
            ("D4-D", "D-4D"),
            ("D4D", "D-4D"),
        ],
    ),
    (
        "SSANGYONG",
        "join fixed engine token",
        &[("270 XVT", "270XVT")],
    ),
    (
        "VOLVO",
        "join series prefix and digits",
        // XC before C so "XC 70" is consumed whole.
        &[
            ("XC 40", "XC40"),
            ("XC 60", "XC60"),
            ("XC 70", "XC70"),
            ("XC 90", "XC90"),
            ("V 40", "V40"),
            ("V 50", "V50"),
            ("V 60", "V60"),
            ("V 70", "V70"),
            ("V 90", "V90"),
            ("S 40", "S40"),
            ("S 60", "S60"),
            ("S 70", "S70"),
            ("S 80", "S80"),
            ("S 90", "S90"),
            ("C 30", "C30"),
            ("C 70", "C70"),
        ],
    ),
];

/// Engine codes glued to their displacement, e.g. `1.6HDI`. Applied for every brand.
const ENGINE_CODE_TOKENS: &[(&str, &[&str])] = &[
    ("HDI", &["1.4", "1.6", "2.0", "2.2"]),
    ("e-HDI", &["1.6", "2.0"]),
    ("TDI", &["1.2", "1.4", "1.6", "1.9", "2.0", "2.5", "3.0"]),
    ("CRDI", &["1.6", "2.0", "2.2"]),
    ("DCI", &["1.5", "2.0"]),
    ("dCi", &["1.5", "2.0"]),
    ("TSI", &["1.0", "1.4", "1.5", "2.0"]),
];

#[derive(Debug, Clone)]
pub(crate) struct NormalizationRule {
    description: String,
    kind: RuleKind,
}

#[derive(Debug, Clone)]
enum RuleKind {
    Literal { from: String, to: String },
    Pattern { regex: Regex, replacement: String },
}

impl NormalizationRule {
    pub(crate) fn literal(from: &str, to: &str, description: &str) -> Result<Self> {
        if from.is_empty() {
            bail!("literal rule '{description}' has an empty match string");
        }

        Ok(Self {
            description: description.to_string(),
            kind: RuleKind::Literal {
                from: from.to_string(),
                to: to.to_string(),
            },
        })
    }

    pub(crate) fn pattern(pattern: &str, replacement: &str, description: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("failed to compile rule pattern: {pattern}"))?;

        Ok(Self {
            description: description.to_string(),
            kind: RuleKind::Pattern {
                regex,
                replacement: replacement.to_string(),
            },
        })
    }

    pub(crate) fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn apply(&self, input: &str) -> String {
        match &self.kind {
            RuleKind::Literal { from, to } => input.replace(from.as_str(), to),
            RuleKind::Pattern { regex, replacement } => {
                regex.replace_all(input, replacement.as_str()).into_owned()
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BrandRuleTable {
    brands: BTreeMap<String, Vec<NormalizationRule>>,
    engine_codes: Vec<NormalizationRule>,
}

impl BrandRuleTable {
    pub(crate) fn builtin() -> Result<Self> {
        let mut table = Self::default();

        for (brand, description, pairs) in BRAND_RULES {
            let rules = table.brands.entry((*brand).to_string()).or_default();
            for (from, to) in *pairs {
                rules.push(NormalizationRule::literal(
                    from,
                    to,
                    &format!("{description}: {from} -> {to}"),
                )?);
            }
        }

        for (code, displacements) in ENGINE_CODE_TOKENS {
            for displacement in *displacements {
                let from = format!("{displacement}{code}");
                let to = format!("{displacement} {code}");
                table.engine_codes.push(NormalizationRule::literal(
                    &from,
                    &to,
                    &format!("space engine code: {from} -> {to}"),
                )?);
            }
        }

        Ok(table)
    }

    /// Built-in rules, extended by the rule file when one is given.
    pub(crate) fn load(rules_path: Option<&Path>) -> Result<Self> {
        let mut table = Self::builtin()?;
        if let Some(path) = rules_path {
            let file: RuleFile = read_json(path)?;
            table
                .extend(file)
                .with_context(|| format!("invalid rule file {}", path.display()))?;
        }
        Ok(table)
    }

    /// Appends file rules after the existing rules of the same scope.
    pub(crate) fn extend(&mut self, file: RuleFile) -> Result<usize> {
        let mut added = 0usize;

        for (brand, specs) in file.brands {
            let brand = brand.trim().to_string();
            if brand.is_empty() {
                bail!("rule file names an empty brand");
            }
            for spec in specs {
                let rule = spec.into_rule(&brand)?;
                debug!(brand = %brand, rule = %rule.description(), "added rule from file");
                self.brands.entry(brand.clone()).or_default().push(rule);
                added += 1;
            }
        }

        for spec in file.engine_codes {
            let rule = spec.into_rule("engine codes")?;
            debug!(rule = %rule.description(), "added engine-code rule from file");
            self.engine_codes.push(rule);
            added += 1;
        }

        Ok(added)
    }

    pub(crate) fn rules_for(&self, brand: &str) -> &[NormalizationRule] {
        self.brands
            .get(brand.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn brand_count(&self) -> usize {
        self.brands.len()
    }

    pub(crate) fn rule_count(&self) -> usize {
        self.brands.values().map(Vec::len).sum::<usize>() + self.engine_codes.len()
    }

    /// Whitespace collapse, brand rules, engine-code spacing, whitespace collapse again.
    /// Reordering these steps changes the output.
    pub(crate) fn normalize_model(&self, brand: &str, model: &str) -> String {
        let mut normalized = clean_text(model);

        for rule in self.rules_for(brand) {
            normalized = rule.apply(&normalized);
        }
        for rule in &self.engine_codes {
            normalized = rule.apply(&normalized);
        }

        clean_text(&normalized)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RuleFile {
    #[serde(default)]
    brands: BTreeMap<String, Vec<RuleSpec>>,
    #[serde(default)]
    engine_codes: Vec<RuleSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RuleSpec {
    Literal {
        from: String,
        to: String,
        #[serde(default)]
        description: Option<String>,
    },
    Pattern {
        pattern: String,
        replacement: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl RuleSpec {
    fn into_rule(self, scope: &str) -> Result<NormalizationRule> {
        match self {
            RuleSpec::Literal {
                from,
                to,
                description,
            } => {
                let description =
                    description.unwrap_or_else(|| format!("{scope}: {from} -> {to}"));
                NormalizationRule::literal(&from, &to, &description)
            }
            RuleSpec::Pattern {
                pattern,
                replacement,
                description,
            } => {
                let description =
                    description.unwrap_or_else(|| format!("{scope}: /{pattern}/ -> {replacement}"));
                NormalizationRule::pattern(&pattern, &replacement, &description)
            }
        }
    }
}
