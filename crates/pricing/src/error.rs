use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum PriceError {
    /// Pricelist path does not exist.
    PricelistNotFound { path: String },
    /// No sheet in the pricelist workbook carries every required column.
    SchemaNotFound { required: Vec<String>, scanned: Vec<String> },
    /// Input table lacks one or more required columns.
    MissingColumns { missing: Vec<String>, required: Vec<String> },
    /// Bytes or file could not be parsed as a spreadsheet.
    UnreadableWorkbook(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Schema validation error (empty column name, zero sample, etc.).
    ConfigValidation(String),
    /// No built-in schema with this name.
    UnknownSchema(String),
    /// IO error (file read, workbook write, etc.).
    Io(String),
}

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PricelistNotFound { path } => write!(f, "pricelist file not found: {path}"),
            Self::SchemaNotFound { required, scanned } => write!(
                f,
                "no sheet contains the required columns {}; sheets found: {}",
                quoted_list(required),
                quoted_list(scanned)
            ),
            Self::MissingColumns { missing, required } => write!(
                f,
                "missing required columns: {}; required columns: {}",
                quoted_list(missing),
                quoted_list(required)
            ),
            Self::UnreadableWorkbook(msg) => write!(f, "cannot read workbook: {msg}"),
            Self::ConfigParse(msg) => write!(f, "schema parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "schema validation error: {msg}"),
            Self::UnknownSchema(name) => write!(f, "unknown schema: {name}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for PriceError {}

fn quoted_list(items: &[String]) -> String {
    let inner: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", inner.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_not_found_names_columns_and_sheets() {
        let err = PriceError::SchemaNotFound {
            required: vec!["Model".into(), "Base Price".into()],
            scanned: vec!["Cover".into(), "Data".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Model'"));
        assert!(msg.contains("'Base Price'"));
        assert!(msg.contains("['Cover', 'Data']"));
    }

    #[test]
    fn missing_columns_lists_missing_first() {
        let err = PriceError::MissingColumns {
            missing: vec!["Cooling Rows + Heating Row".into()],
            required: vec!["Model".into(), "Cooling Rows + Heating Row".into()],
        };
        assert_eq!(
            err.to_string(),
            "missing required columns: ['Cooling Rows + Heating Row']; \
             required columns: ['Model', 'Cooling Rows + Heating Row']"
        );
    }
}
