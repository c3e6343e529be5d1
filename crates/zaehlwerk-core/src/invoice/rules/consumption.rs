//! Current-period consumption location and German number normalization.
//!
//! Two passes over the text: first only "aktuell"/"current"-qualified
//! readings, then any "kWh"-suffixed number whose surrounding context does
//! not mark it as a prior-period value. When OCR recognizes the same figure
//! several times, the numeric maximum is kept (ties go to the first
//! occurrence); this is a heuristic for duplicated fragments, not a business
//! rule, and lives in one spot so it can be tuned.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::models::config::ExtractionConfig;

use super::patterns::{CONSUMPTION_KWH, CURRENT_CONSUMPTION};
use super::{ExtractionMatch, FieldExtractor};

/// Consumption locator.
pub struct ConsumptionExtractor {
    min_kwh: Decimal,
    max_kwh: Decimal,
    context_window_chars: usize,
    previous_period_markers: Vec<String>,
}

impl ConsumptionExtractor {
    /// Create a locator with the default Austrian invoice bounds.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create a locator from the extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            min_kwh: config.consumption_min_kwh,
            max_kwh: config.consumption_max_kwh,
            context_window_chars: config.context_window_chars,
            previous_period_markers: config
                .previous_period_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }

    /// Normalize a raw token, round to one fractional digit and apply the
    /// plausibility bounds. Unparsable or out-of-range tokens are discarded.
    fn candidate_value(&self, raw: &str) -> Option<Decimal> {
        let value = normalize_german_decimal(raw)?.round_dp(1);
        (value > self.min_kwh && value < self.max_kwh).then_some(value)
    }

    /// True if the window around the match span names a previous period.
    fn is_previous_period(&self, text: &str, start: usize, end: usize) -> bool {
        let window = context_window(text, start, end, self.context_window_chars).to_lowercase();
        self.previous_period_markers
            .iter()
            .any(|marker| window.contains(marker))
    }

    /// Pass 1: readings qualified by "aktuell"/"current".
    fn locate_current(&self, text: &str) -> Option<ExtractionMatch<Decimal>> {
        let mut best: Option<ExtractionMatch<Decimal>> = None;

        for caps in CURRENT_CONSUMPTION.captures_iter(text) {
            let token = caps.get(1).unwrap();
            let Some(value) = self.candidate_value(token.as_str()) else {
                continue;
            };

            // Max-wins policy; ties keep the earliest occurrence.
            if best.as_ref().is_none_or(|b| value > b.value) {
                best = Some(
                    ExtractionMatch::new(value, 0.95, token.as_str())
                        .with_position(token.start(), token.end()),
                );
            }
        }

        best
    }

    /// Pass 2: any kWh-suffixed number not attributed to a prior period.
    fn locate_unqualified(&self, text: &str) -> Option<ExtractionMatch<Decimal>> {
        let mut best: Option<ExtractionMatch<Decimal>> = None;

        for caps in CONSUMPTION_KWH.captures_iter(text) {
            let full = caps.get(0).unwrap();
            let token = caps.get(1).unwrap();

            if self.is_previous_period(text, full.start(), full.end()) {
                continue;
            }
            let Some(value) = self.candidate_value(token.as_str()) else {
                continue;
            };

            if best.as_ref().is_none_or(|b| value > b.value) {
                best = Some(
                    ExtractionMatch::new(value, 0.7, token.as_str())
                        .with_position(token.start(), token.end()),
                );
            }
        }

        best
    }
}

impl Default for ConsumptionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ConsumptionExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        if let Some(m) = self.locate_current(text) {
            debug!("Located current consumption {} kWh", m.value);
            results.push(format_kwh(m));
        } else if let Some(m) = self.locate_unqualified(text) {
            debug!("Located unqualified consumption {} kWh", m.value);
            results.push(format_kwh(m));
        }

        results
    }
}

fn format_kwh(m: ExtractionMatch<Decimal>) -> ExtractionMatch<String> {
    ExtractionMatch {
        value: format!("{:.1}", m.value),
        confidence: m.confidence,
        position: m.position,
        source: m.source,
    }
}

/// Locate the current consumption in OCR text, as a decimal string with one
/// fractional digit.
pub fn locate_consumption_kwh(text: &str) -> Option<String> {
    ConsumptionExtractor::new().extract(text).map(|m| m.value)
}

/// Parse a number written with German or English separator conventions.
///
/// When both separators appear, whichever comes last is the decimal
/// separator ("2.573,1" and "2,573.1" both parse to 2573.1). A single
/// separator type is a decimal separator only if it is followed by one or
/// two digits, otherwise it groups thousands.
pub fn normalize_german_decimal(raw: &str) -> Option<Decimal> {
    let token = raw.trim();
    if token.is_empty() {
        return None;
    }

    let has_dot = token.contains('.');
    let has_comma = token.contains(',');

    let normalized = if has_dot && has_comma {
        if token.rfind(',') > token.rfind('.') {
            token.replace('.', "").replace(',', ".")
        } else {
            token.replace(',', "")
        }
    } else if has_comma {
        let after = &token[token.rfind(',').unwrap() + 1..];
        if is_fraction(after) {
            token.replace(',', ".")
        } else {
            token.replace(',', "")
        }
    } else if has_dot {
        let after = &token[token.rfind('.').unwrap() + 1..];
        if is_fraction(after) {
            token.to_string()
        } else {
            token.replace('.', "")
        }
    } else {
        token.to_string()
    };

    Decimal::from_str(&normalized).ok()
}

/// One or two trailing digits mark a decimal fraction.
fn is_fraction(after_separator: &str) -> bool {
    (1..=2).contains(&after_separator.len())
        && after_separator.chars().all(|c| c.is_ascii_digit())
}

/// A window of `radius` characters on each side of a byte span, respecting
/// UTF-8 boundaries.
fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = if radius == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_german_style() {
        assert_eq!(normalize_german_decimal("2.573,1"), Some(dec("2573.1")));
        assert_eq!(normalize_german_decimal("1.234.567,89"), Some(dec("1234567.89")));
        assert_eq!(normalize_german_decimal("812,5"), Some(dec("812.5")));
    }

    #[test]
    fn test_normalize_english_style() {
        assert_eq!(normalize_german_decimal("2,573.1"), Some(dec("2573.1")));
        assert_eq!(normalize_german_decimal("1,234,567"), Some(dec("1234567")));
    }

    #[test]
    fn test_normalize_single_separator_as_thousands() {
        assert_eq!(normalize_german_decimal("2.573"), Some(dec("2573")));
        assert_eq!(normalize_german_decimal("3,000"), Some(dec("3000")));
    }

    #[test]
    fn test_normalize_idempotent_on_canonical_form() {
        assert_eq!(normalize_german_decimal("2573.1"), Some(dec("2573.1")));
        assert_eq!(normalize_german_decimal("2573"), Some(dec("2573")));
    }

    #[test]
    fn test_normalize_garbage() {
        assert_eq!(normalize_german_decimal(""), None);
        assert_eq!(normalize_german_decimal("abc"), None);
        assert_eq!(normalize_german_decimal("1,23,4"), None);
    }

    #[test]
    fn test_current_beats_previous_period() {
        let text = "aktuell: 2.573,1 kWh\nVorperiode: 3.000,0 kWh";
        assert_eq!(locate_consumption_kwh(text), Some("2573.1".to_string()));
    }

    #[test]
    fn test_fallback_pass_skips_previous_period() {
        let text = "Vorperiode: 3.000,0 kWh\n\
                    Zwischensumme Netzentgelte und Abgaben laut Aufstellung Seite zwei\n\
                    Gesamtverbrauch: 2.573,1 kWh";
        assert_eq!(locate_consumption_kwh(text), Some("2573.1".to_string()));
    }

    #[test]
    fn test_only_previous_period_yields_nothing() {
        assert_eq!(locate_consumption_kwh("Vorperiode: 3.000,0 kWh"), None);
        assert_eq!(locate_consumption_kwh("previous reading 812.5 kWh"), None);
    }

    #[test]
    fn test_fallback_keeps_maximum() {
        let text = "Strom 812,5 kWh\nGesamtverbrauch 2.573,1 kWh";
        assert_eq!(locate_consumption_kwh(text), Some("2573.1".to_string()));
    }

    #[test]
    fn test_bounds_filter_implausible_values() {
        assert_eq!(locate_consumption_kwh("Beleg 483920584 kWh"), None);
        assert_eq!(locate_consumption_kwh("0,5 kWh"), None);
        assert_eq!(locate_consumption_kwh("100000 kWh"), None);
        assert_eq!(locate_consumption_kwh("1 kWh"), None);
    }

    #[test]
    fn test_integer_reading_gets_one_fraction_digit() {
        assert_eq!(
            locate_consumption_kwh("Verbrauch: 2573 kWh"),
            Some("2573.0".to_string())
        );
    }

    #[test]
    fn test_no_unit_no_match() {
        assert_eq!(locate_consumption_kwh("aktuell: 2.573,1"), None);
        assert_eq!(locate_consumption_kwh(""), None);
    }
}
