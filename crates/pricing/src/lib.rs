//! `pricefill-pricing`: pricelist matching engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns priced rows and
//! diagnostics. No CLI or filesystem dependencies; workbooks are reached
//! through the [`sheet::WorkbookSource`] trait.

pub mod engine;
pub mod error;
pub mod index;
pub mod model;
pub mod normalize;
pub mod pricer;
pub mod schema;
pub mod sheet;
pub mod summary;

pub use engine::{load_pricelist, price_table, LoadedPricelist, PricelistDiagnostics};
pub use error::PriceError;
pub use index::{build_index, Conflict, PricelistIndex};
pub use model::{Cell, ConfigKey, MatchStatus, NormalizedKey, PriceFields, PriceRecord, PricedRow, PricedTable, Table};
pub use pricer::price_rows;
pub use schema::PriceSchema;
pub use sheet::{select_sheet, WorkbookSource};
pub use summary::{summarize, PriceSummary};
