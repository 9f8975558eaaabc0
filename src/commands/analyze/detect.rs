use std::collections::{BTreeMap, BTreeSet};

use crate::model::{BrandInconsistencies, InconsistencyGroup};

/// Bucket key for one model string: lower-cased, spaces and hyphens removed.
pub(crate) fn normalized_model_key(model: &str) -> String {
    model.to_lowercase().replace([' ', '-'], "")
}

/// Groups distinct model spellings per brand by [`normalized_model_key`] and keeps the
/// buckets whose members differ by more than letter case. Brands, groups and members
/// come out sorted.
pub(crate) fn detect_inconsistencies<'a, I>(models: I) -> Vec<BrandInconsistencies>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut by_brand = BTreeMap::<&'a str, BTreeMap<String, BTreeSet<&'a str>>>::new();
    for (brand, model) in models {
        by_brand
            .entry(brand)
            .or_default()
            .entry(normalized_model_key(model))
            .or_default()
            .insert(model);
    }

    by_brand
        .into_iter()
        .filter_map(|(brand, buckets)| {
            let groups = buckets
                .into_iter()
                .filter(|(_, members)| differs_beyond_case(members))
                .map(|(normalized_key, members)| InconsistencyGroup {
                    normalized_key,
                    members: members.into_iter().map(str::to_string).collect(),
                })
                .collect::<Vec<InconsistencyGroup>>();

            (!groups.is_empty()).then(|| BrandInconsistencies {
                brand: brand.to_string(),
                groups,
            })
        })
        .collect()
}

fn differs_beyond_case(members: &BTreeSet<&str>) -> bool {
    members.len() > 1
        && members
            .iter()
            .map(|member| member.to_lowercase())
            .collect::<BTreeSet<String>>()
            .len()
            > 1
}
