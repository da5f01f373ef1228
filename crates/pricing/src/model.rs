use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::find_column;

// ---------------------------------------------------------------------------
// Tabular input
// ---------------------------------------------------------------------------

/// A single spreadsheet cell as seen by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Empty, whitespace-only text, or a non-finite number.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => !n.is_finite(),
            Self::Bool(_) => false,
        }
    }

    /// Text rendering used for key normalization. Integral numbers drop the
    /// fractional part so a numeric `50` cell reads as `"50"`, not `"50.0"`.
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            Self::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }

    /// Numeric value of a price cell. Text is accepted when it parses as a
    /// number once surrounding whitespace and thousands separators are
    /// removed. Anything else is absent.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Self::Number).unwrap_or(Self::Empty)
    }
}

/// Header row plus data rows, in sheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// 0-based sheet row holding the header. Non-zero when the used range
    /// starts below the first row.
    pub header_row: usize,
}

impl Table {
    /// Build a table from a header and data rows. Blank header cells and
    /// data wider than the header get `Unnamed: N` column names so every
    /// cell stays addressable by name.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows
            .iter()
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
            .max(columns.len());

        let columns = (0..width)
            .map(|idx| match columns.get(idx) {
                Some(name) if !name.trim().is_empty() => name.clone(),
                _ => format!("Unnamed: {idx}"),
            })
            .collect();

        Self {
            columns,
            rows,
            header_row: 0,
        }
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// 1-based sheet row of data row `row`.
    pub fn sheet_row(&self, row: usize) -> usize {
        self.header_row + row + 2
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case/whitespace-insensitive column lookup.
    pub fn find_column(&self, wanted: &str) -> Option<usize> {
        find_column(&self.columns, wanted)
    }

    /// Cell at (row, col); short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ConfigKey {
    Text(String),
    Int(i64),
    Empty,
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Composite join key: (model, configuration).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedKey {
    pub model: String,
    pub config: ConfigKey,
}

impl NormalizedKey {
    pub fn new(model: impl Into<String>, config: ConfigKey) -> Self {
        Self {
            model: model.into(),
            config,
        }
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.model, self.config)
    }
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Shape of the price data a schema carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLayout {
    /// Separate base and row prices; total is their sum.
    Split,
    /// One stored total price.
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum PriceRecord {
    Split { base: Option<f64>, row: Option<f64> },
    Total { total: Option<f64> },
}

impl PriceRecord {
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Split { base, row } => base.is_some() && row.is_some(),
            Self::Total { total } => total.is_some(),
        }
    }

    /// Total price, only when every component is present.
    pub fn total(&self) -> Option<f64> {
        match self {
            Self::Split {
                base: Some(base),
                row: Some(row),
            } => Some(base + row),
            Self::Split { .. } => None,
            Self::Total { total } => *total,
        }
    }

    pub fn fields(&self) -> PriceFields {
        match self {
            Self::Split { base, row } => PriceFields {
                base: *base,
                row: *row,
                total: self.total(),
            },
            Self::Total { total } => PriceFields {
                base: None,
                row: None,
                total: *total,
            },
        }
    }
}

impl fmt::Display for PriceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<f64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
        match self {
            Self::Split { base, row } => write!(f, "base={} row={}", show(base), show(row)),
            Self::Total { total } => write!(f, "total={}", show(total)),
        }
    }
}

/// Price columns emitted for one output row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceFields {
    pub base: Option<f64>,
    pub row: Option<f64>,
    pub total: Option<f64>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Ok,
    NotFound,
    IncompletePrice,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotFound => "NOT_FOUND",
            Self::IncompletePrice => "INCOMPLETE_PRICE",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input row after pricing. `cells` is the untouched input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedRow {
    /// 1-based sheet row, counting the header as row 1.
    pub row_number: usize,
    pub cells: Vec<Cell>,
    pub key: NormalizedKey,
    pub prices: PriceFields,
    pub status: MatchStatus,
}

impl PricedRow {
    /// Values for the appended columns, in output column order.
    pub fn output_cells(&self, layout: PriceLayout) -> Vec<Cell> {
        let status = Cell::Text(self.status.as_str().to_string());
        match layout {
            PriceLayout::Split => vec![
                self.prices.base.into(),
                self.prices.row.into(),
                self.prices.total.into(),
                status,
            ],
            PriceLayout::Total => vec![self.prices.total.into(), status],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedTable {
    /// Input header, unchanged.
    pub columns: Vec<String>,
    /// Names of the price and status columns, matching `output_cells` order.
    pub output_columns: Vec<String>,
    pub layout: PriceLayout,
    pub rows: Vec<PricedRow>,
}

impl PricedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flatten to a plain table: every input column in order, then the
    /// output columns. An input column whose name equals an output column
    /// exactly is overwritten in place instead of duplicated.
    pub fn to_table(&self) -> Table {
        let mut columns = self.columns.clone();
        let mut targets = Vec::with_capacity(self.output_columns.len());
        for name in &self.output_columns {
            match columns.iter().position(|c| c == name) {
                Some(idx) => targets.push(idx),
                None => {
                    columns.push(name.clone());
                    targets.push(columns.len() - 1);
                }
            }
        }

        let width = columns.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = row.cells.clone();
                if cells.len() < width {
                    cells.resize(width, Cell::Empty);
                }
                for (target, value) in targets.iter().zip(row.output_cells(self.layout)) {
                    cells[*target] = value;
                }
                cells
            })
            .collect();

        Table::from_rows(columns, rows)
    }
}
