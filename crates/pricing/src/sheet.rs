use log::{debug, warn};

use crate::error::PriceError;
use crate::model::Table;

/// Data rows read per sheet when probing headers.
pub const HEADER_SAMPLE_ROWS: usize = 5;

/// A workbook the engine can scan. Implemented by the xlsx reader in
/// `pricefill-io` and by [`MemoryWorkbook`] for pre-loaded tables.
pub trait WorkbookSource {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet. `limit` caps the number of data rows returned; the
    /// header row is always included.
    fn read_sheet(&mut self, name: &str, limit: Option<usize>) -> Result<Table, PriceError>;
}

/// Tables already in memory, in workbook order.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    pub sheets: Vec<(String, Table)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, table: Table) -> Self {
        self.sheets.push((name.into(), table));
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str, limit: Option<usize>) -> Result<Table, PriceError> {
        let (_, table) = self
            .sheets
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| PriceError::UnreadableWorkbook(format!("no sheet named '{name}'")))?;

        let mut table = table.clone();
        if let Some(limit) = limit {
            table.rows.truncate(limit);
        }
        Ok(table)
    }
}

/// Name of the first sheet, in workbook order, whose header covers every
/// required column (case/whitespace-insensitive).
pub fn select_sheet<W: WorkbookSource + ?Sized>(
    source: &mut W,
    required: &[String],
) -> Result<String, PriceError> {
    let scanned = source.sheet_names();

    for name in &scanned {
        let preview = match source.read_sheet(name, Some(HEADER_SAMPLE_ROWS)) {
            Ok(preview) => preview,
            Err(e) => {
                warn!("skipping sheet '{name}' while selecting pricelist: {e}");
                continue;
            }
        };

        let missing: Vec<&String> = required
            .iter()
            .filter(|col| preview.find_column(col).is_none())
            .collect();

        if missing.is_empty() {
            debug!("selected sheet '{name}'");
            return Ok(name.clone());
        }
        debug!("sheet '{name}' lacks columns {missing:?}");
    }

    Err(PriceError::SchemaNotFound {
        required: required.to_vec(),
        scanned,
    })
}
