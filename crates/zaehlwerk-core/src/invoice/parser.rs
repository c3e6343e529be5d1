//! Field parser combining the three rule-based locators.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::ExtractedInvoiceData;

use super::rules::{
    address::AddressExtractor, consumption::ConsumptionExtractor,
    meter_point::MeterPointExtractor, FieldExtractor,
};

/// Result of invoice field extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub data: ExtractedInvoiceData,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice field parsing.
///
/// Parsing never fails: garbled or empty input yields an all-absent record.
pub trait InvoiceParser {
    /// Parse invoice fields from text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Rule-based field parser.
///
/// The three locators are pure functions of the input text with no data
/// dependency on each other; they are run sequentially here, but a host may
/// evaluate them in parallel with identical results.
pub struct InvoiceFieldParser {
    address: AddressExtractor,
    meter_point: MeterPointExtractor,
    consumption: ConsumptionExtractor,
}

impl InvoiceFieldParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::with_config(&ExtractionConfig::default())
    }

    /// Create a parser from an extraction configuration.
    pub fn with_config(config: &ExtractionConfig) -> Self {
        Self {
            address: AddressExtractor::new(),
            meter_point: MeterPointExtractor::from_config(config),
            consumption: ConsumptionExtractor::from_config(config),
        }
    }
}

impl Default for InvoiceFieldParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for InvoiceFieldParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing invoice fields from {} characters of text", text.len());

        let address = self.address.extract(text).map(|m| m.value);
        if address.is_none() {
            warnings.push("Could not extract address".to_string());
        }

        let meter_point_id = self.meter_point.extract(text).map(|m| m.value);
        if meter_point_id.is_none() {
            warnings.push("Could not extract meter point id".to_string());
        }

        let current_consumption_kwh = self.consumption.extract(text).map(|m| m.value);
        if current_consumption_kwh.is_none() {
            warnings.push("Could not extract current consumption".to_string());
        }

        let data = ExtractedInvoiceData {
            address,
            meter_point_id,
            current_consumption_kwh,
        };

        debug!(
            "Extracted {}/3 fields in {:?}",
            data.field_count(),
            start.elapsed()
        );

        ExtractionResult {
            data,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Extract the three invoice fields from OCR text.
pub fn extract_invoice_data(text: &str) -> ExtractedInvoiceData {
    InvoiceFieldParser::new().parse(text).data
}
