use std::collections::HashMap;

use log::warn;
use serde::Serialize;

use crate::error::PriceError;
use crate::model::{NormalizedKey, PriceRecord, Table};
use crate::normalize::{normalize_config, normalize_model};
use crate::schema::{PriceColumns, PriceSchema};

/// Two pricelist rows mapping the same key to different prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub key: NormalizedKey,
    pub previous: PriceRecord,
    pub incoming: PriceRecord,
    /// 1-based sheet row of the incoming (winning) row.
    pub row_number: usize,
}

/// Read-only lookup from normalized key to price record.
#[derive(Debug, Clone, Default)]
pub struct PricelistIndex {
    entries: HashMap<NormalizedKey, PriceRecord>,
}

impl PricelistIndex {
    pub fn get(&self, key: &NormalizedKey) -> Option<&PriceRecord> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert with last-write-wins. Returns the replaced record when it
    /// differed from `record`.
    fn insert(&mut self, key: NormalizedKey, record: PriceRecord) -> Option<PriceRecord> {
        match self.entries.insert(key, record) {
            Some(previous) if previous != record => Some(previous),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
enum PriceCols {
    Split { base: usize, row: usize },
    Total { total: usize },
}

/// Build the pricelist index in sheet order. Later rows win on duplicate
/// keys; every overwrite with a different price is reported as a conflict.
pub fn build_index(
    table: &Table,
    schema: &PriceSchema,
) -> Result<(PricelistIndex, Vec<Conflict>), PriceError> {
    let required = schema.pricelist_required();
    let missing: Vec<String> = required
        .iter()
        .filter(|c| table.find_column(c).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(PriceError::MissingColumns { missing, required });
    }

    let col = |name: &str| table.find_column(name).unwrap_or_default();
    let model_idx = col(&schema.pricelist.model);
    let config_idx = col(&schema.pricelist.config);
    let price_cols = match &schema.pricelist.prices {
        PriceColumns::Split { base, row } => PriceCols::Split {
            base: col(base),
            row: col(row),
        },
        PriceColumns::Total { total } => PriceCols::Total { total: col(total) },
    };

    let mut index = PricelistIndex::default();
    let mut conflicts = Vec::new();

    for row in 0..table.len() {
        let key = NormalizedKey::new(
            normalize_model(table.cell(row, model_idx), schema.keys.device_codes),
            normalize_config(table.cell(row, config_idx), schema.keys.config_mode),
        );

        let record = match price_cols {
            PriceCols::Split { base, row: row_col } => PriceRecord::Split {
                base: table.cell(row, base).as_number(),
                row: table.cell(row, row_col).as_number(),
            },
            PriceCols::Total { total } => PriceRecord::Total {
                total: table.cell(row, total).as_number(),
            },
        };

        if let Some(previous) = index.insert(key.clone(), record) {
            conflicts.push(Conflict {
                key,
                previous,
                incoming: record,
                row_number: table.sheet_row(row),
            });
        }
    }

    if !conflicts.is_empty() {
        warn!(
            "pricelist has {} duplicate key(s) with different prices; using the last seen value",
            conflicts.len()
        );
    }

    Ok((index, conflicts))
}
