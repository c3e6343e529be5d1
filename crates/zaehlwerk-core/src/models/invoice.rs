//! Result record shared by the rule-based engine and the LLM path.

use serde::{Deserialize, Serialize};

/// Structured fields extracted from one utility invoice.
///
/// All three fields are independently optional: absence means "no confident
/// match", never an error and never a best-guess placeholder. The serialized
/// field names are the wire contract with the LLM-based extractor, which must
/// produce the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedInvoiceData {
    /// Human-readable postal address, up to three logical lines joined
    /// with ", " (name, street + house number, postal code + city).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Meter-point identifier (Zählpunktnummer), exactly 33 alphanumeric
    /// characters, conventionally starting with the country code "AT".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_point_id: Option<String>,

    /// Current-period consumption in kWh as a canonical decimal string with
    /// one fractional digit, e.g. "2573.1".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_consumption_kwh: Option<String>,
}

impl ExtractedInvoiceData {
    /// True if no field was extracted.
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.meter_point_id.is_none()
            && self.current_consumption_kwh.is_none()
    }

    /// Number of populated fields.
    pub fn field_count(&self) -> usize {
        [
            self.address.is_some(),
            self.meter_point_id.is_some(),
            self.current_consumption_kwh.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_serializes_without_fields() {
        let data = ExtractedInvoiceData::default();
        assert!(data.is_empty());
        assert_eq!(serde_json::to_string(&data).unwrap(), "{}");
    }

    #[test]
    fn test_camel_case_wire_names() {
        let data = ExtractedInvoiceData {
            address: Some("Max Mustermann, Hauptstraße 12, 1010 Wien".to_string()),
            meter_point_id: Some("AT0040000502000000000000010127094".to_string()),
            current_consumption_kwh: Some("2573.1".to_string()),
        };

        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"meterPointId\""));
        assert!(json.contains("\"currentConsumptionKwh\""));

        let back: ExtractedInvoiceData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
        assert_eq!(back.field_count(), 3);
    }
}
