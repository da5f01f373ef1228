use serde::{Deserialize, Serialize};

use crate::error::PriceError;
use crate::model::PriceLayout;
use crate::normalize::ConfigMode;

pub const DEFAULT_OUTPUT_SHEET: &str = "PRICED";
pub const DEFAULT_NOT_FOUND_SAMPLE: usize = 30;

// ---------------------------------------------------------------------------
// Top-level schema
// ---------------------------------------------------------------------------

/// Describes one pricelist/input pairing: which columns hold the key and the
/// prices, how keys are normalized, and what the output columns are called.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PriceSchema {
    pub name: String,
    pub pricelist: PricelistColumns,
    pub input: InputColumns,
    #[serde(default)]
    pub output: OutputColumns,
    #[serde(default)]
    pub keys: KeyRules,
    #[serde(default)]
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// Column maps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PricelistColumns {
    pub model: String,
    pub config: String,
    pub prices: PriceColumns,
}

/// Price column arity. `base` + `row` means the total is their sum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PriceColumns {
    Split { base: String, row: String },
    Total { total: String },
}

impl PriceColumns {
    pub fn layout(&self) -> PriceLayout {
        match self {
            Self::Split { .. } => PriceLayout::Split,
            Self::Total { .. } => PriceLayout::Total,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Split { base, row } => vec![base.as_str(), row.as_str()],
            Self::Total { total } => vec![total.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct InputColumns {
    pub model: String,
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct OutputColumns {
    #[serde(default = "default_base_col")]
    pub base: String,
    #[serde(default = "default_row_col")]
    pub row: String,
    #[serde(default = "default_total_col")]
    pub total: String,
    #[serde(default = "default_status_col")]
    pub status: String,
    #[serde(default = "default_sheet")]
    pub sheet: String,
}

fn default_base_col() -> String {
    "Base Price".into()
}

fn default_row_col() -> String {
    "Row Price".into()
}

fn default_total_col() -> String {
    "Total Price".into()
}

fn default_status_col() -> String {
    "Match Status".into()
}

fn default_sheet() -> String {
    DEFAULT_OUTPUT_SHEET.into()
}

impl Default for OutputColumns {
    fn default() -> Self {
        Self {
            base: default_base_col(),
            row: default_row_col(),
            total: default_total_col(),
            status: default_status_col(),
            sheet: default_sheet(),
        }
    }
}

// ---------------------------------------------------------------------------
// Key rules + report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct KeyRules {
    #[serde(default)]
    pub config_mode: ConfigMode,
    /// Rewrite `EBH50` style device codes to `EBH 050`.
    #[serde(default)]
    pub device_codes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default = "default_sample")]
    pub not_found_sample: usize,
}

fn default_sample() -> usize {
    DEFAULT_NOT_FOUND_SAMPLE
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            not_found_sample: DEFAULT_NOT_FOUND_SAMPLE,
        }
    }
}

// ---------------------------------------------------------------------------
// Built-ins
// ---------------------------------------------------------------------------

pub const BUILTIN_SCHEMAS: &[&str] = &["fcu", "fcu-total", "fcu-device"];

impl PriceSchema {
    /// Fan-coil pricelist with separate base and row prices; rows keyed by
    /// `2+1R` style text.
    pub fn fcu() -> Self {
        Self {
            name: "fcu".into(),
            pricelist: PricelistColumns {
                model: "Model".into(),
                config: "Cooling Rows + Heating Row".into(),
                prices: PriceColumns::Split {
                    base: "Base Price".into(),
                    row: "Row Price".into(),
                },
            },
            input: InputColumns {
                model: "Model".into(),
                config: "Cooling Rows + Heating Row".into(),
            },
            output: OutputColumns::default(),
            keys: KeyRules::default(),
            report: ReportConfig::default(),
        }
    }

    /// Single total price keyed by model and a numeric row count.
    pub fn fcu_total() -> Self {
        Self {
            name: "fcu-total".into(),
            pricelist: PricelistColumns {
                model: "model".into(),
                config: "rows".into(),
                prices: PriceColumns::Total { total: "price".into() },
            },
            input: InputColumns {
                model: "model".into(),
                config: "rows".into(),
            },
            output: OutputColumns::default(),
            keys: KeyRules {
                config_mode: ConfigMode::Numeric,
                device_codes: false,
            },
            report: ReportConfig::default(),
        }
    }

    /// `fcu-total` plus device-code canonicalization of model names.
    pub fn fcu_device() -> Self {
        let mut schema = Self::fcu_total();
        schema.name = "fcu-device".into();
        schema.keys.device_codes = true;
        schema
    }

    pub fn builtin(name: &str) -> Result<Self, PriceError> {
        match name {
            "fcu" => Ok(Self::fcu()),
            "fcu-total" => Ok(Self::fcu_total()),
            "fcu-device" => Ok(Self::fcu_device()),
            other => Err(PriceError::UnknownSchema(format!(
                "{other} (available: {})",
                BUILTIN_SCHEMAS.join(", ")
            ))),
        }
    }

    // -----------------------------------------------------------------------
    // Parse + Validate
    // -----------------------------------------------------------------------

    pub fn from_toml(input: &str) -> Result<Self, PriceError> {
        let schema: PriceSchema =
            toml::from_str(input).map_err(|e| PriceError::ConfigParse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), PriceError> {
        if self.name.trim().is_empty() {
            return Err(PriceError::ConfigValidation("name must not be empty".into()));
        }

        let mut named = vec![
            ("pricelist.model", self.pricelist.model.as_str()),
            ("pricelist.config", self.pricelist.config.as_str()),
            ("input.model", self.input.model.as_str()),
            ("input.config", self.input.config.as_str()),
            ("output.status", self.output.status.as_str()),
            ("output.total", self.output.total.as_str()),
            ("output.sheet", self.output.sheet.as_str()),
        ];
        match &self.pricelist.prices {
            PriceColumns::Split { base, row } => {
                named.push(("pricelist.prices.base", base.as_str()));
                named.push(("pricelist.prices.row", row.as_str()));
                named.push(("output.base", self.output.base.as_str()));
                named.push(("output.row", self.output.row.as_str()));
            }
            PriceColumns::Total { total } => named.push(("pricelist.prices.total", total.as_str())),
        }
        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(PriceError::ConfigValidation(format!("{field} must not be empty")));
            }
        }

        // Output columns must be distinct or one would overwrite another
        let outputs = self.output_columns();
        for (i, a) in outputs.iter().enumerate() {
            if outputs[i + 1..].contains(a) {
                return Err(PriceError::ConfigValidation(format!(
                    "output column '{a}' is used more than once"
                )));
            }
        }

        if self.output.sheet.chars().count() > 31 {
            return Err(PriceError::ConfigValidation(format!(
                "output.sheet '{}' exceeds 31 characters",
                self.output.sheet
            )));
        }

        if self.report.not_found_sample == 0 {
            return Err(PriceError::ConfigValidation(
                "report.not_found_sample must be at least 1".into(),
            ));
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Derived column sets
    // -----------------------------------------------------------------------

    pub fn layout(&self) -> PriceLayout {
        self.pricelist.prices.layout()
    }

    /// Columns a pricelist sheet must carry to be selected.
    pub fn pricelist_required(&self) -> Vec<String> {
        let mut cols = vec![self.pricelist.model.clone(), self.pricelist.config.clone()];
        cols.extend(self.pricelist.prices.names().into_iter().map(String::from));
        cols
    }

    pub fn input_required(&self) -> Vec<String> {
        vec![self.input.model.clone(), self.input.config.clone()]
    }

    /// Appended column names in the order `PricedRow::output_cells` emits.
    pub fn output_columns(&self) -> Vec<String> {
        match self.layout() {
            PriceLayout::Split => vec![
                self.output.base.clone(),
                self.output.row.clone(),
                self.output.total.clone(),
                self.output.status.clone(),
            ],
            PriceLayout::Total => vec![self.output.total.clone(), self.output.status.clone()],
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
