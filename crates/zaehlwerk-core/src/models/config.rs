//! Configuration for the field-extraction engine.
//!
//! The acceptance bound on consumption values and the identifier length are
//! domain constants of the Austrian invoicing format. They are kept as named,
//! overridable settings so other locales' conventions can be supported
//! without touching the extraction rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZaehlwerkError};

/// Length of an Austrian meter-point identifier (Zählpunktnummer).
pub const METER_POINT_ID_LEN: usize = 33;

/// Country-code prefix conventionally carried by Austrian meter points.
pub const METER_POINT_COUNTRY_PREFIX: &str = "AT";

/// Exclusive lower bound for a plausible consumption reading in kWh.
/// Filters years, invoice numbers and customer ids that happen to sit next
/// to a "kWh" unit in garbled OCR output.
pub const CONSUMPTION_MIN_KWH: i64 = 1;

/// Exclusive upper bound for a plausible consumption reading in kWh.
pub const CONSUMPTION_MAX_KWH: i64 = 100_000;

/// Radius in characters of the context window inspected around a consumption
/// candidate when deciding whether it belongs to a previous billing period.
pub const CONTEXT_WINDOW_CHARS: usize = 50;

/// Keywords marking a prior-period reading near a consumption candidate.
pub const PREVIOUS_PERIOD_MARKERS: [&str; 2] = ["vorperiode", "previous"];

/// Extraction engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Required length of a meter-point identifier.
    pub meter_point_id_len: usize,

    /// Exclusive lower bound for accepted consumption values (kWh).
    pub consumption_min_kwh: Decimal,

    /// Exclusive upper bound for accepted consumption values (kWh).
    pub consumption_max_kwh: Decimal,

    /// Radius of the prior-period context window, in characters.
    pub context_window_chars: usize,

    /// Keywords that disqualify a consumption candidate as prior-period.
    pub previous_period_markers: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            meter_point_id_len: METER_POINT_ID_LEN,
            consumption_min_kwh: Decimal::from(CONSUMPTION_MIN_KWH),
            consumption_max_kwh: Decimal::from(CONSUMPTION_MAX_KWH),
            context_window_chars: CONTEXT_WINDOW_CHARS,
            previous_period_markers: PREVIOUS_PERIOD_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings describe a usable extraction setup.
    pub fn validate(&self) -> Result<()> {
        if self.meter_point_id_len < 3 {
            return Err(ZaehlwerkError::Config(format!(
                "meter_point_id_len must be at least 3, got {}",
                self.meter_point_id_len
            )));
        }
        if self.consumption_min_kwh >= self.consumption_max_kwh {
            return Err(ZaehlwerkError::Config(format!(
                "consumption bounds are empty: ({}, {})",
                self.consumption_min_kwh, self.consumption_max_kwh
            )));
        }
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
