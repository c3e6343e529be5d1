//! Postal address location in noisy multi-line OCR text.
//!
//! OCR output breaks a logically single address block across one to three
//! physical lines in unpredictable ways. Three tiers of decreasing context
//! are tried in order; the first tier that yields a candidate wins. A
//! candidate needs at least two of the three logical parts (name, street +
//! number, postal code + city), so a lone postal-code-like line is never
//! reported as an address.

use tracing::debug;

use super::patterns::{
    COMPOSITE_ADDRESS, NAME_LINE, POSTAL_CITY_LINE, STREET_LINE, STREET_SUFFIXES,
};
use super::{ExtractionMatch, FieldExtractor};

/// Address locator.
pub struct AddressExtractor;

impl AddressExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Tier 1: anchor on a postal-code line, then look upwards for the
    /// street line and an optional name line.
    fn locate_postal_anchored(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        for (i, line) in lines.iter().enumerate() {
            let Some(postal) = postal_part(line) else {
                continue;
            };

            let mut parts = Vec::new();
            if let Some(street) = i
                .checked_sub(1)
                .and_then(|j| street_part(lines[j]))
            {
                if let Some(name) = i.checked_sub(2).and_then(|j| name_part(lines[j])) {
                    parts.push(name);
                }
                parts.push(street);
            }
            parts.push(postal);

            if parts.len() >= 2 {
                return Some(ExtractionMatch::new(parts.join(", "), 0.9, *line));
            }
        }
        None
    }

    /// Tier 2: adjacent street line followed by postal-code line, with an
    /// optional name line above the pair.
    fn locate_street_then_postal(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        for i in 0..lines.len().saturating_sub(1) {
            let Some(street) = street_part(lines[i]) else {
                continue;
            };
            let Some(postal) = postal_part(lines[i + 1]) else {
                continue;
            };

            let mut parts = Vec::new();
            if let Some(name) = i.checked_sub(1).and_then(|j| name_part(lines[j])) {
                parts.push(name);
            }
            parts.push(street);
            parts.push(postal);

            return Some(ExtractionMatch::new(parts.join(", "), 0.85, lines[i]));
        }
        None
    }

    /// Tier 3: everything collapsed onto one line.
    fn locate_single_line(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        for line in lines {
            if let Some(caps) = COMPOSITE_ADDRESS.captures(line) {
                let mut parts = Vec::new();
                if let Some(name) = caps.get(1) {
                    parts.push(name.as_str().to_string());
                }
                parts.push(format!("{} {}", &caps[2], &caps[3]));
                parts.push(format!("{} {}", &caps[4], &caps[5]));

                return Some(ExtractionMatch::new(parts.join(", "), 0.7, *line));
            }
        }
        None
    }
}

impl Default for AddressExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AddressExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut results = Vec::new();

        // First success wins; later tiers are kept as weaker alternatives
        // so that extract() sees them in precedence order.
        if let Some(m) = self.locate_postal_anchored(&lines) {
            debug!("Located address via postal anchor: {}", m.value);
            results.push(m);
        }
        if let Some(m) = self.locate_street_then_postal(&lines) {
            if !results.iter().any(|r| r.value == m.value) {
                results.push(m);
            }
        }
        if let Some(m) = self.locate_single_line(&lines) {
            if !results.iter().any(|r| r.value == m.value) {
                results.push(m);
            }
        }

        results
    }
}

/// Locate a postal address in OCR text.
pub fn locate_address(text: &str) -> Option<String> {
    AddressExtractor::new().extract(text).map(|m| m.value)
}

fn postal_part(line: &str) -> Option<String> {
    POSTAL_CITY_LINE
        .captures(line)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
}

fn street_part(line: &str) -> Option<String> {
    STREET_LINE
        .captures(line)
        .map(|caps| format!("{} {}", caps[1].trim_end(), &caps[2]))
}

fn name_part(line: &str) -> Option<String> {
    if NAME_LINE.is_match(line) && !contains_street_suffix(line) {
        Some(line.to_string())
    } else {
        None
    }
}

/// True if any whitespace-separated token ends in a street-type suffix.
fn contains_street_suffix(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered
        .split_whitespace()
        .any(|token| STREET_SUFFIXES.iter().any(|suffix| token.ends_with(suffix)))
}
