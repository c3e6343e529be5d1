//! Meter-point identifier (Zählpunktnummer) location.
//!
//! Five tiers of decreasing confidence, first success wins: labeled and
//! space-grouped, labeled and contiguous, unlabeled country-prefixed
//! (grouped, then contiguous), and a fully generic 33-character token as the
//! weakest fallback. Every candidate must contain at least one letter and
//! one digit, which filters phone numbers, customer ids and similar
//! pure-numeric tokens.

use regex::Regex;
use tracing::debug;

use crate::models::config::{ExtractionConfig, METER_POINT_ID_LEN};

use super::patterns::{METER_AT_GROUPED, METER_LABELED_GROUPED, METER_POINT_LABEL};
use super::{ExtractionMatch, FieldExtractor};

/// Meter-point identifier locator.
pub struct MeterPointExtractor {
    id_len: usize,
    labeled_contiguous: Regex,
    contiguous_prefixed: Regex,
    generic: Regex,
}

impl MeterPointExtractor {
    /// Create a locator for the standard Austrian identifier length.
    pub fn new() -> Self {
        Self::with_id_len(METER_POINT_ID_LEN)
    }

    /// Create a locator for a custom identifier length.
    pub fn with_id_len(id_len: usize) -> Self {
        let labeled_contiguous = Regex::new(&format!(
            r"(?i:{METER_POINT_LABEL})[\s:.-]*([0-9A-Za-z]{{{id_len}}})\b"
        ))
        .unwrap();
        let contiguous_prefixed = Regex::new(&format!(
            r"\bAT[0-9A-Za-z]{{{}}}\b",
            id_len.saturating_sub(2)
        ))
        .unwrap();
        let generic = Regex::new(&format!(r"\b[0-9A-Za-z]{{{id_len}}}\b")).unwrap();

        Self {
            id_len,
            labeled_contiguous,
            contiguous_prefixed,
            generic,
        }
    }

    /// Create a locator from the extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::with_id_len(config.meter_point_id_len)
    }

    fn push_unique(
        &self,
        results: &mut Vec<ExtractionMatch<String>>,
        candidate: String,
        confidence: f32,
        source: &str,
        start: usize,
        end: usize,
    ) {
        if !qualifies(&candidate, self.id_len) {
            return;
        }
        if results.iter().any(|r| r.value == candidate) {
            return;
        }
        results.push(
            ExtractionMatch::new(candidate, confidence, source).with_position(start, end),
        );
    }
}

impl Default for MeterPointExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MeterPointExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // Tier 1: labeled, space-grouped.
        for caps in METER_LABELED_GROUPED.captures_iter(text) {
            let grouped = caps.get(1).unwrap();
            if let Some(id) = accumulate_groups(grouped.as_str(), self.id_len) {
                self.push_unique(
                    &mut results,
                    id,
                    0.95,
                    grouped.as_str(),
                    grouped.start(),
                    grouped.end(),
                );
            }
        }

        // Tier 2: labeled, contiguous.
        for caps in self.labeled_contiguous.captures_iter(text) {
            let token = caps.get(1).unwrap();
            self.push_unique(
                &mut results,
                token.as_str().to_string(),
                0.9,
                token.as_str(),
                token.start(),
                token.end(),
            );
        }

        // Tier 3: unlabeled, space-grouped, country-prefixed.
        for caps in METER_AT_GROUPED.captures_iter(text) {
            let grouped = caps.get(1).unwrap();
            if let Some(id) = accumulate_groups(grouped.as_str(), self.id_len) {
                self.push_unique(
                    &mut results,
                    id,
                    0.8,
                    grouped.as_str(),
                    grouped.start(),
                    grouped.end(),
                );
            }
        }

        // Tier 4: unlabeled, contiguous, country-prefixed.
        for m in self.contiguous_prefixed.find_iter(text) {
            self.push_unique(
                &mut results,
                m.as_str().to_string(),
                0.75,
                m.as_str(),
                m.start(),
                m.end(),
            );
        }

        // Tier 5: any alphanumeric token of the right length.
        for m in self.generic.find_iter(text) {
            self.push_unique(
                &mut results,
                m.as_str().to_string(),
                0.5,
                m.as_str(),
                m.start(),
                m.end(),
            );
        }

        if let Some(best) = results.first() {
            debug!(
                "Located meter point {} with confidence {:.2}",
                best.value, best.confidence
            );
        }

        results
    }
}

/// Locate the meter-point identifier in OCR text.
pub fn locate_meter_point_id(text: &str) -> Option<String> {
    MeterPointExtractor::new().extract(text).map(|m| m.value)
}

/// Concatenate whitespace-separated groups until the target length is
/// reached. The groups must tile the identifier exactly; a partial final
/// group means the candidate is rejected.
fn accumulate_groups(grouped: &str, target: usize) -> Option<String> {
    let mut id = String::new();
    for token in grouped.split_whitespace() {
        if id.len() >= target {
            break;
        }
        id.push_str(token);
    }
    (id.len() == target).then_some(id)
}

/// A plausible identifier has the exact configured length and mixes letters
/// and digits.
fn qualifies(candidate: &str, id_len: usize) -> bool {
    candidate.len() == id_len
        && candidate.chars().any(|c| c.is_ascii_alphabetic())
        && candidate.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPED: &str = "AT 004000 05020 00000 00000 00101 27094";
    const CONTIGUOUS: &str = "AT0040000502000000000000010127094";

    #[test]
    fn test_labeled_grouped() {
        let text = format!("Ihre Zählpunktnummer: {GROUPED}\nRechnungsbetrag");
        assert_eq!(locate_meter_point_id(&text), Some(CONTIGUOUS.to_string()));
    }

    #[test]
    fn test_labeled_contiguous() {
        let text = format!("Zählpunkt-Nr.: {CONTIGUOUS} Strom");
        assert_eq!(locate_meter_point_id(&text), Some(CONTIGUOUS.to_string()));
    }

    #[test]
    fn test_unlabeled_grouped() {
        let text = format!("Anlage Haushalt\n{GROUPED}\nAbleseart: Fernauslesung");
        assert_eq!(locate_meter_point_id(&text), Some(CONTIGUOUS.to_string()));
    }

    #[test]
    fn test_unlabeled_contiguous() {
        let text = format!("Referenz {CONTIGUOUS} Tarif Basis");
        assert_eq!(locate_meter_point_id(&text), Some(CONTIGUOUS.to_string()));
    }

    #[test]
    fn test_labeled_beats_unlabeled() {
        let decoy = "Q7K3M9X2P5W8Z1R4T6Y0U3I7O2A5S8D4F";
        assert_eq!(decoy.len(), 33);
        let text = format!("Beleg {decoy}\nZählpunktnummer: {GROUPED}");
        assert_eq!(locate_meter_point_id(&text), Some(CONTIGUOUS.to_string()));
    }

    #[test]
    fn test_generic_fallback() {
        let token = "DE1230000502000000000000010127094";
        assert_eq!(token.len(), 33);
        let text = format!("Kennung {token} Ende");
        assert_eq!(locate_meter_point_id(&text), Some(token.to_string()));
    }

    #[test]
    fn test_pure_numeric_token_rejected() {
        let digits = "123456789012345678901234567890123";
        assert_eq!(digits.len(), 33);
        let text = format!("Zahlungsreferenz {digits}");
        assert_eq!(locate_meter_point_id(&text), None);
    }

    #[test]
    fn test_phone_number_not_an_id() {
        assert_eq!(locate_meter_point_id("Hotline: AT 0664 1234567"), None);
    }

    #[test]
    fn test_returned_id_invariants() {
        let text = format!("Zählpunkt {GROUPED}");
        let id = locate_meter_point_id(&text).unwrap();
        assert_eq!(id.len(), 33);
        assert!(id.chars().any(|c| c.is_ascii_alphabetic()));
        assert!(id.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_custom_length() {
        let extractor = MeterPointExtractor::with_id_len(11);
        let m = extractor.extract("Zählpunkt: AT123456789").unwrap();
        assert_eq!(m.value, "AT123456789");
    }
}
