// Excel import (calamine) and priced-workbook export (rust_xlsxwriter)

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use pricefill_pricing::{Cell, PriceError, Table, WorkbookSource};

/// Excel sheet limits
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// A workbook opened for reading (xlsx, xls, xlsb, ods).
///
/// The file is read into memory once; sheets are parsed on demand, so header
/// probing during sheet selection never touches the disk again.
pub struct XlsxSource {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl XlsxSource {
    pub fn open(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, String> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| format!("Failed to open Excel file: {}", e))?;
        Ok(Self { workbook })
    }

    /// Read a sheet into a table. The first row of the used range is the
    /// header; `limit` caps the number of data rows.
    pub fn read_range(&mut self, name: &str, limit: Option<usize>) -> Result<Table, String> {
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| format!("Failed to read sheet '{}': {}", name, e))?;
        Ok(range_to_table(&range, limit))
    }

    /// Read the first sheet in workbook order.
    pub fn read_first(&mut self) -> Result<(String, Table), String> {
        let name = self
            .workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| "Excel file contains no sheets".to_string())?;
        let table = self.read_range(&name, None)?;
        Ok((name, table))
    }
}

impl WorkbookSource for XlsxSource {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    fn read_sheet(&mut self, name: &str, limit: Option<usize>) -> Result<Table, PriceError> {
        self.read_range(name, limit)
            .map_err(PriceError::UnreadableWorkbook)
    }
}

fn range_to_table(range: &Range<Data>, limit: Option<usize>) -> Table {
    // Range start offset (data may not begin at A1). Leading blank columns
    // are kept so they surface as `Unnamed: N`; the start row becomes the
    // table's header row so row numbers match the sheet.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let lead = start_col as usize;

    let widen = |row: &[Data]| -> Vec<Cell> {
        std::iter::repeat(Cell::Empty)
            .take(lead)
            .chain(row.iter().map(convert_cell))
            .collect()
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let columns = widen(header)
        .iter()
        .map(|cell| cell.as_text().unwrap_or_default())
        .collect();

    let data = rows
        .take(limit.unwrap_or(usize::MAX))
        .map(widen)
        .collect();

    Table::from_rows(columns, data).with_header_row(start_row as usize)
}

/// Map a calamine value onto the engine's cell model. Error cells read as
/// empty; dates keep their Excel serial number.
pub fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Float(n) if n.is_finite() => Cell::Number(*n),
        Data::Float(_) => Cell::Empty,
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
    }
}

/// Write `table` as a single-sheet workbook and return the file bytes.
/// The header row is bold.
pub fn write_table(table: &Table, sheet_name: &str) -> Result<Vec<u8>, String> {
    if table.columns.len() > MAX_COLS {
        return Err(format!(
            "Table has {} columns; Excel allows at most {}",
            table.columns.len(),
            MAX_COLS
        ));
    }
    if table.len() >= MAX_ROWS {
        return Err(format!(
            "Table has {} rows; Excel allows at most {}",
            table.len(),
            MAX_ROWS - 1
        ));
    }

    let mut xlsx_workbook = XlsxWorkbook::new();
    let worksheet = xlsx_workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

    let header = Format::new().set_bold();
    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header)
            .map_err(|e| format!("Failed to write header '{}': {}", name, e))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate().take(MAX_COLS) {
            let col16 = col as u16;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Text(s) => worksheet.write_string(row32, col16, s),
                Cell::Number(n) if n.is_finite() => worksheet.write_number(row32, col16, *n),
                Cell::Number(_) => continue,
                Cell::Bool(b) => worksheet.write_boolean(row32, col16, *b),
            };
            written.map_err(|e| format!("Failed to write cell ({}, {}): {}", row32, col, e))?;
        }
    }

    xlsx_workbook
        .save_to_buffer()
        .map_err(|e| format!("Failed to save XLSX file: {}", e))
}
