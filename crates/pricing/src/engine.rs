use log::info;
use serde::Serialize;

use crate::error::PriceError;
use crate::index::{build_index, Conflict, PricelistIndex};
use crate::model::{PricedTable, Table};
use crate::pricer::price_rows;
use crate::schema::PriceSchema;
use crate::sheet::{select_sheet, WorkbookSource};
use crate::summary::{summarize, PriceSummary};

/// What a pricelist load found. Returned to the host alongside the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricelistDiagnostics {
    pub schema: String,
    pub sheet: String,
    /// Data rows read from the selected sheet (header excluded).
    pub rows: usize,
    /// Distinct keys in the index.
    pub keys: usize,
    pub conflicts: Vec<Conflict>,
    pub engine_version: String,
    pub loaded_at: String,
}

/// An index plus the diagnostics of the load that built it. Immutable once
/// built; share it by reference or behind an `Arc`.
#[derive(Debug, Clone)]
pub struct LoadedPricelist {
    pub index: PricelistIndex,
    pub diagnostics: PricelistDiagnostics,
}

/// Select the pricelist sheet, read it fully and build the index.
pub fn load_pricelist<W: WorkbookSource + ?Sized>(
    source: &mut W,
    schema: &PriceSchema,
) -> Result<LoadedPricelist, PriceError> {
    let sheet = select_sheet(source, &schema.pricelist_required())?;
    let table = source.read_sheet(&sheet, None)?;
    let (index, conflicts) = build_index(&table, schema)?;

    info!(
        "loaded pricelist sheet '{}' with schema '{}': {} rows, {} keys, {} conflicts",
        sheet,
        schema.name,
        table.len(),
        index.len(),
        conflicts.len()
    );

    Ok(LoadedPricelist {
        diagnostics: PricelistDiagnostics {
            schema: schema.name.clone(),
            sheet,
            rows: table.len(),
            keys: index.len(),
            conflicts,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            loaded_at: chrono::Utc::now().to_rfc3339(),
        },
        index,
    })
}

/// Price an input table and summarize the result.
pub fn price_table(
    table: &Table,
    pricelist: &LoadedPricelist,
    schema: &PriceSchema,
) -> Result<(PricedTable, PriceSummary), PriceError> {
    let priced = price_rows(table, &pricelist.index, schema)?;
    let summary = summarize(&priced, schema.report.not_found_sample);

    info!(
        "priced {} rows: {} ok, {} not found, {} incomplete",
        summary.total, summary.ok, summary.not_found, summary.incomplete
    );

    Ok((priced, summary))
}
