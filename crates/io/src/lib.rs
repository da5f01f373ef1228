// Workbook and CSV I/O for pricefill

pub mod cache;
pub mod csv;
pub mod pricelist;
pub mod xlsx;

pub use cache::PricelistCache;
pub use pricelist::{
    load_pricelist, load_pricelist_bytes, price_csv, price_file, read_input, read_input_bytes,
    serialize, write_output,
};
pub use xlsx::XlsxSource;
