//! Host-facing operations: load a pricelist from disk, price an uploaded
//! workbook, serialize the result.

use std::path::Path;

use log::info;

use pricefill_pricing::{
    price_table, LoadedPricelist, PriceError, PriceSchema, PriceSummary, PricedTable, Table,
};

use crate::xlsx::XlsxSource;

/// Load and index the pricelist workbook at `path`.
pub fn load_pricelist(path: &Path, schema: &PriceSchema) -> Result<LoadedPricelist, PriceError> {
    let bytes = read_pricelist_bytes(path)?;
    let loaded = load_pricelist_bytes(bytes, schema)?;
    info!("pricelist source: {}", path.display());
    Ok(loaded)
}

/// Load and index a pricelist workbook already in memory.
pub fn load_pricelist_bytes(
    bytes: Vec<u8>,
    schema: &PriceSchema,
) -> Result<LoadedPricelist, PriceError> {
    let mut source = XlsxSource::from_bytes(bytes).map_err(PriceError::UnreadableWorkbook)?;
    pricefill_pricing::load_pricelist(&mut source, schema)
}

pub(crate) fn read_pricelist_bytes(path: &Path) -> Result<Vec<u8>, PriceError> {
    if !path.is_file() {
        return Err(PriceError::PricelistNotFound {
            path: path.display().to_string(),
        });
    }
    std::fs::read(path).map_err(|e| PriceError::Io(format!("{}: {}", path.display(), e)))
}

/// Price an uploaded workbook (first sheet) against a loaded pricelist.
pub fn price_file(
    bytes: Vec<u8>,
    pricelist: &LoadedPricelist,
    schema: &PriceSchema,
) -> Result<(PricedTable, PriceSummary), PriceError> {
    let table = read_input_bytes(bytes, None)?;
    price_table(&table, pricelist, schema)
}

/// Price an uploaded CSV/TSV file against a loaded pricelist.
pub fn price_csv(
    bytes: Vec<u8>,
    pricelist: &LoadedPricelist,
    schema: &PriceSchema,
) -> Result<(PricedTable, PriceSummary), PriceError> {
    let table = crate::csv::read_table_from_bytes(bytes).map_err(PriceError::Io)?;
    price_table(&table, pricelist, schema)
}

/// Read an input workbook from memory: the named sheet, or the first one.
pub fn read_input_bytes(bytes: Vec<u8>, sheet: Option<&str>) -> Result<Table, PriceError> {
    let mut source = XlsxSource::from_bytes(bytes).map_err(PriceError::UnreadableWorkbook)?;
    match sheet {
        Some(name) => source
            .read_range(name, None)
            .map_err(PriceError::UnreadableWorkbook),
        None => source
            .read_first()
            .map(|(_, table)| table)
            .map_err(PriceError::UnreadableWorkbook),
    }
}

/// Read an input file. `.csv`, `.tsv` and `.txt` go through the CSV reader;
/// everything else is opened as a workbook.
pub fn read_input(path: &Path, sheet: Option<&str>) -> Result<Table, PriceError> {
    if is_delimited(path) {
        return crate::csv::read_table(path).map_err(PriceError::Io);
    }
    let bytes =
        std::fs::read(path).map_err(|e| PriceError::Io(format!("{}: {}", path.display(), e)))?;
    read_input_bytes(bytes, sheet)
}

/// Render a priced table as a single-sheet workbook.
pub fn serialize(priced: &PricedTable, sheet_name: &str) -> Result<Vec<u8>, PriceError> {
    crate::xlsx::write_table(&priced.to_table(), sheet_name).map_err(PriceError::Io)
}

/// Write a priced table to `path`: CSV when the extension says so, a
/// workbook otherwise.
pub fn write_output(
    priced: &PricedTable,
    path: &Path,
    sheet_name: &str,
) -> Result<(), PriceError> {
    if is_delimited(path) {
        return crate::csv::write_table(&priced.to_table(), path).map_err(PriceError::Io);
    }
    let bytes = serialize(priced, sheet_name)?;
    std::fs::write(path, bytes).map_err(|e| PriceError::Io(format!("{}: {}", path.display(), e)))
}

fn is_delimited(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "csv" | "tsv" | "txt"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_extensions() {
        assert!(is_delimited(Path::new("out.csv")));
        assert!(is_delimited(Path::new("IN.TSV")));
        assert!(!is_delimited(Path::new("out.xlsx")));
        assert!(!is_delimited(Path::new("noext")));
    }

    #[test]
    fn absent_pricelist_is_not_found() {
        let err = load_pricelist(Path::new("/nonexistent/prices.xlsx"), &PriceSchema::fcu())
            .unwrap_err();
        assert!(matches!(err, PriceError::PricelistNotFound { .. }));
    }

    #[test]
    fn garbage_upload_is_unreadable() {
        let err = read_input_bytes(b"PK\x03\x04 nope".to_vec(), None).unwrap_err();
        assert!(matches!(err, PriceError::UnreadableWorkbook(_)));
    }
}
