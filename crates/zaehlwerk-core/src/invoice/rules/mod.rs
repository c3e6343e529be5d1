//! Rule-based field locators for Austrian utility invoices.
//!
//! Each locator is a pure function of the input text. They share no state
//! and are evaluated independently; the coordinator in
//! [`crate::invoice::parser`] composes their results into one record.

pub mod address;
pub mod consumption;
pub mod meter_point;
pub mod patterns;

pub use address::{locate_address, AddressExtractor};
pub use consumption::{locate_consumption_kwh, normalize_german_decimal, ConsumptionExtractor};
pub use meter_point::{locate_meter_point_id, MeterPointExtractor};

/// Trait for field locators.
pub trait FieldExtractor {
    /// The type of value this locator produces.
    type Output;

    /// Extract the best match from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all candidate matches, strongest tier first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A located field with match context.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
