//! Boundary with the LLM-based extraction path.
//!
//! An alternative extractor may answer with the same three fields as
//! prompted structured output. Model replies arrive as free text: the JSON
//! object may sit inside a Markdown code fence or between prose sentences,
//! field values may be numbers instead of strings, and individual values may
//! violate the record invariants. This module turns such a reply into an
//! [`ExtractedInvoiceData`] when possible; the caller falls back to the
//! rule-based engine's record when it is not (full replacement, never a
//! per-field merge).

use serde_json::Value;
use tracing::debug;

use crate::models::config::{ExtractionConfig, METER_POINT_ID_LEN};
use crate::models::invoice::ExtractedInvoiceData;

use super::rules::consumption::normalize_german_decimal;

/// Parse a model reply into an extraction record.
///
/// Returns `None` when no JSON object can be located or none of the three
/// fields carries a usable value.
pub fn parse_llm_response(raw: &str) -> Option<ExtractedInvoiceData> {
    let value = locate_json_object(raw)?;

    let data = ExtractedInvoiceData {
        address: string_field(&value, "address").filter(|s| !s.is_empty()),
        meter_point_id: string_field(&value, "meterPointId")
            .map(|s| s.split_whitespace().collect::<String>())
            .filter(|s| plausible_meter_point_id(s)),
        current_consumption_kwh: consumption_field(&value),
    };

    if data.is_empty() {
        debug!("LLM response parsed but contained no usable field");
        return None;
    }

    Some(data)
}

/// Pick between the LLM record and the engine record.
pub fn resolve_extraction(
    llm: Option<ExtractedInvoiceData>,
    engine: ExtractedInvoiceData,
) -> ExtractedInvoiceData {
    match llm {
        Some(data) if !data.is_empty() => data,
        _ => engine,
    }
}

/// Find and deserialize the first JSON object in a model reply.
fn locate_json_object(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();

    // Fast path: the reply is the object itself.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Otherwise scan for a balanced object, fence markers and all.
    let start = trimmed.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in trimmed[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &trimmed[start..start + offset + 1];
                    return serde_json::from_str::<Value>(candidate)
                        .ok()
                        .filter(Value::is_object);
                }
            }
            _ => {}
        }
    }

    None
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize the consumption field to the canonical one-fraction-digit form,
/// applying the same plausibility bounds as the rule-based engine.
fn consumption_field(value: &Value) -> Option<String> {
    let config = ExtractionConfig::default();
    let raw = string_field(value, "currentConsumptionKwh")?;
    let parsed = normalize_german_decimal(&raw)?.round_dp(1);

    (parsed > config.consumption_min_kwh && parsed < config.consumption_max_kwh)
        .then(|| format!("{parsed:.1}"))
}

fn plausible_meter_point_id(candidate: &str) -> bool {
    candidate.len() == METER_POINT_ID_LEN
        && candidate.chars().all(|c| c.is_ascii_alphanumeric())
        && candidate.chars().any(|c| c.is_ascii_alphabetic())
        && candidate.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const ID: &str = "AT0040000502000000000000010127094";

    #[test]
    fn test_parse_plain_json() {
        let raw = format!(
            r#"{{"address": "Max Mustermann, Hauptstraße 12, 1010 Wien", "meterPointId": "{ID}", "currentConsumptionKwh": "2.573,1"}}"#
        );
        let data = parse_llm_response(&raw).unwrap();
        assert_eq!(data.meter_point_id.as_deref(), Some(ID));
        assert_eq!(data.current_consumption_kwh.as_deref(), Some("2573.1"));
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let raw = format!(
            "Here is the extracted data:\n```json\n{{\"meterPointId\": \"{ID}\"}}\n```\nLet me know if you need anything else."
        );
        let data = parse_llm_response(&raw).unwrap();
        assert_eq!(data.meter_point_id.as_deref(), Some(ID));
        assert_eq!(data.address, None);
    }

    #[test]
    fn test_numeric_consumption_value() {
        let raw = r#"{"currentConsumptionKwh": 2573.1}"#;
        let data = parse_llm_response(raw).unwrap();
        assert_eq!(data.current_consumption_kwh.as_deref(), Some("2573.1"));
    }

    #[test]
    fn test_invalid_fields_are_dropped() {
        let raw = r#"{"meterPointId": "AT123", "currentConsumptionKwh": "0"}"#;
        assert_eq!(parse_llm_response(raw), None);
    }

    #[test]
    fn test_spaced_meter_point_id_is_compacted() {
        let raw = r#"{"meterPointId": "AT 004000 05020 00000 00000 00101 27094"}"#;
        let data = parse_llm_response(raw).unwrap();
        assert_eq!(data.meter_point_id.as_deref(), Some(ID));
    }

    #[test]
    fn test_malformed_response() {
        assert_eq!(parse_llm_response(""), None);
        assert_eq!(parse_llm_response("I could not find any data."), None);
        assert_eq!(parse_llm_response("{\"meterPointId\": "), None);
        assert_eq!(parse_llm_response("[1, 2, 3]"), None);
    }

    #[test]
    fn test_resolution_prefers_usable_llm_record() {
        let engine = ExtractedInvoiceData {
            address: Some("Hauptstraße 12, 1010 Wien".to_string()),
            ..Default::default()
        };
        let llm = ExtractedInvoiceData {
            meter_point_id: Some(ID.to_string()),
            ..Default::default()
        };

        // Full replacement: the engine's address does not leak through.
        let resolved = resolve_extraction(Some(llm.clone()), engine.clone());
        assert_eq!(resolved, llm);

        let resolved = resolve_extraction(None, engine.clone());
        assert_eq!(resolved, engine);
    }
}
