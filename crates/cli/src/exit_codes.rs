//! CLI Exit Code Registry
//!
//! Single source of truth for `pricefill` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success (unmatched rows are not failures)         |
//! | 2    | Usage error (bad arguments, conflicting options)  |
//! | 3    | Pricelist file not found                          |
//! | 4    | No pricelist sheet carries the schema's columns   |
//! | 5    | Input is missing required columns                 |
//! | 6    | File is not a readable workbook                   |
//! | 7    | Schema config invalid or unknown                  |
//! | 8    | Filesystem or writer failure                      |

use pricefill_pricing::PriceError;

/// Success - every input priced and written.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// Pricelist path does not exist or is not a file.
pub const EXIT_PRICELIST_NOT_FOUND: u8 = 3;

/// No sheet in the pricelist has every required column.
pub const EXIT_SCHEMA_NOT_FOUND: u8 = 4;

/// Input table lacks the model or configuration column.
pub const EXIT_MISSING_COLUMNS: u8 = 5;

/// Pricelist or input bytes are not a parseable spreadsheet.
pub const EXIT_UNREADABLE_WORKBOOK: u8 = 6;

/// Schema TOML failed to parse or validate, or the built-in name is unknown.
pub const EXIT_INVALID_SCHEMA: u8 = 7;

/// Reading or writing a file failed.
pub const EXIT_IO: u8 = 8;

/// Map a PriceError to its exit code.
pub fn price_exit_code(err: &PriceError) -> u8 {
    match err {
        PriceError::PricelistNotFound { .. } => EXIT_PRICELIST_NOT_FOUND,
        PriceError::SchemaNotFound { .. } => EXIT_SCHEMA_NOT_FOUND,
        PriceError::MissingColumns { .. } => EXIT_MISSING_COLUMNS,
        PriceError::UnreadableWorkbook(_) => EXIT_UNREADABLE_WORKBOOK,
        PriceError::ConfigParse(_)
        | PriceError::ConfigValidation(_)
        | PriceError::UnknownSchema(_) => EXIT_INVALID_SCHEMA,
        PriceError::Io(_) => EXIT_IO,
    }
}
