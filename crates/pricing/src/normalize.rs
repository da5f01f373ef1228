//! Key normalization.
//!
//! Every function here is total: dirty cells degrade to an empty key, which
//! then surfaces as `NOT_FOUND` at pricing time rather than as an error.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::model::{Cell, ConfigKey};

/// How the configuration cell is turned into a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigMode {
    /// Uppercase with all whitespace removed; keeps tokens like `2+1R`.
    Text,
    /// Parsed as a number and truncated to an integer.
    Numeric,
}

impl Default for ConfigMode {
    fn default() -> Self {
        Self::Text
    }
}

/// Alphabetic prefix + 1-3 digits, optionally space-separated, optional
/// leading zeros: `EBH50`, `EBH 050`, `EBH0050`.
fn device_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z]+) ?0*([0-9]{1,3})$").unwrap())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a model identifier.
///
/// Trim, uppercase, fold hyphens to spaces, collapse whitespace. With
/// `device_codes` set, a whole-value device code is rewritten to
/// `<PREFIX> <NNN>`.
pub fn normalize_model(raw: &Cell, device_codes: bool) -> String {
    match raw.as_text() {
        Some(text) => normalize_model_str(&text, device_codes),
        None => String::new(),
    }
}

pub fn normalize_model_str(raw: &str, device_codes: bool) -> String {
    let upper = collapse_whitespace(&raw.trim().to_uppercase());
    let folded = collapse_whitespace(&upper.replace('-', " "));

    if !device_codes {
        return folded;
    }

    match device_code_re().captures(&folded) {
        Some(caps) => {
            let number: u32 = caps[2].parse().unwrap_or(0);
            format!("{} {:03}", &caps[1], number)
        }
        None => folded,
    }
}

/// Normalize a row/heating configuration cell.
pub fn normalize_config(raw: &Cell, mode: ConfigMode) -> ConfigKey {
    let Some(text) = raw.as_text() else {
        return ConfigKey::Empty;
    };

    match mode {
        ConfigMode::Text => {
            let key: String = text
                .trim()
                .to_uppercase()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if key.is_empty() {
                ConfigKey::Empty
            } else {
                ConfigKey::Text(key)
            }
        }
        ConfigMode::Numeric => {
            let parsed = match raw {
                Cell::Number(n) => Some(*n),
                _ => text.trim().parse::<f64>().ok(),
            };
            match parsed {
                Some(n) if n.is_finite() && n.abs() < 9.0e18 => ConfigKey::Int(n.trunc() as i64),
                _ => ConfigKey::Empty,
            }
        }
    }
}

/// Header normalization for column matching: trim, collapse internal
/// whitespace, lowercase.
pub fn normalize_header(raw: &str) -> String {
    collapse_whitespace(raw).to_lowercase()
}

/// Index of the first column whose normalized name equals `wanted`'s.
pub fn find_column(columns: &[String], wanted: &str) -> Option<usize> {
    let wanted = normalize_header(wanted);
    columns.iter().position(|c| normalize_header(c) == wanted)
}
