use std::collections::HashMap;

use serde_json::json;
use tracing::warn;

use super::*;
use crate::model::{IdentityCollision, VehicleRecord};
use crate::util::sha256_hex;

/// Unambiguous encoding of the identity fields. `cc`, `cylinders`, `fuelType`, `kw`
/// and `cvf` are deliberately not part of it.
pub(crate) fn composite_key(draft: &VehicleDraft) -> String {
    json!([
        draft.brand,
        draft.model,
        draft.start_year,
        draft.end_year,
        draft.cv,
        draft.value
    ])
    .to_string()
}

pub(crate) fn derive_id(composite_key: &str) -> String {
    let mut hex = sha256_hex(composite_key.as_bytes());
    hex.truncate(ID_HEX_LEN);
    hex
}

pub(crate) fn assign_id(draft: VehicleDraft) -> VehicleRecord {
    let id = derive_id(&composite_key(&draft));
    VehicleRecord {
        id,
        brand: draft.brand,
        model: draft.model,
        start_year: draft.start_year,
        end_year: draft.end_year,
        cc: draft.cc,
        cylinders: draft.cylinders,
        fuel_type: draft.fuel_type,
        kw: draft.kw,
        cvf: draft.cvf,
        cv: draft.cv,
        value: draft.value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Insertion {
    New,
    Duplicate,
    Replaced,
}

/// Keyed store over the traversal-ordered record sequence. Last write wins, but the
/// replaced record keeps the position of the first occurrence.
#[derive(Debug, Default)]
pub(crate) struct IdentityAssigner {
    records: Vec<VehicleRecord>,
    keys: Vec<String>,
    positions: HashMap<String, usize>,
    collisions: Vec<IdentityCollision>,
    duplicates_merged: usize,
}

#[derive(Debug, Default)]
pub(crate) struct IdentityOutcome {
    pub records: Vec<VehicleRecord>,
    pub collisions: Vec<IdentityCollision>,
    pub duplicates_merged: usize,
}

impl IdentityAssigner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, draft: VehicleDraft) -> Insertion {
        let key = composite_key(&draft);
        let record = assign_id(draft);

        let Some(&position) = self.positions.get(&record.id) else {
            self.positions.insert(record.id.clone(), self.records.len());
            self.records.push(record);
            self.keys.push(key);
            return Insertion::New;
        };

        if self.keys[position] == key && self.records[position] == record {
            self.duplicates_merged += 1;
            return Insertion::Duplicate;
        }

        if self.keys[position] != key {
            warn!(
                id = %record.id,
                previous_key = %self.keys[position],
                key = %key,
                "distinct composite keys hashed to the same id"
            );
        }

        let previous = std::mem::replace(&mut self.records[position], record.clone());
        warn!(
            id = %record.id,
            brand = %record.brand,
            model = %record.model,
            previous_cc = %previous.cc,
            cc = %record.cc,
            previous_cylinders = %previous.cylinders,
            cylinders = %record.cylinders,
            previous_fuel_type = %previous.fuel_type,
            fuel_type = %record.fuel_type,
            previous_kw = %previous.kw,
            kw = %record.kw,
            "identity collision; later record replaces earlier one"
        );
        self.collisions.push(IdentityCollision {
            id: record.id.clone(),
            composite_key: key.clone(),
            previous,
            replacement: record,
        });
        self.keys[position] = key;

        Insertion::Replaced
    }

    pub(crate) fn finish(self) -> IdentityOutcome {
        IdentityOutcome {
            records: self.records,
            collisions: self.collisions,
            duplicates_merged: self.duplicates_merged,
        }
    }
}
