//! Common regex patterns for Austrian utility invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Label variants announcing a meter-point identifier.
pub const METER_POINT_LABEL: &str =
    r"z[äa]hlpunkt[\s.-]?(?:nummer|nr\.?)?|zp[\s.-]?nr\.?|z[äa]hlernummer|metering[\s-]?point";

/// Street-type suffixes that mark the last token of a street name.
/// "str." is covered by the generic abbreviated-token alternative.
pub const STREET_SUFFIXES: [&str; 7] = [
    "straße", "strasse", "platz", "weg", "gasse", "allee", "ring",
];

lazy_static! {
    // Address patterns (applied per trimmed line)

    /// Austrian postal-code line: exactly four digits, then capitalized city name(s).
    pub static ref POSTAL_CITY_LINE: Regex = Regex::new(
        r"^(\d{4})\s+(\p{Lu}[\p{L}]*(?:[ -]\p{Lu}[\p{L}]*)*\.?)$"
    ).unwrap();

    /// Street line: up to two leading capitalized tokens, a capitalized token
    /// ending in a street-type suffix or a period, then a house number with
    /// optional letter and door parts.
    pub static ref STREET_LINE: Regex = Regex::new(
        r"^((?:\p{Lu}[\p{L}.]*\s+){0,2}(?:\p{Lu}\p{L}*(?i:stra(?:ß|ss)e|platz|weg|gasse|allee|ring)|Stra(?:ß|ss)e|Platz|Weg|Gasse|Allee|Ring|\p{Lu}[\p{L}]*\.))\s+(\d{1,4}\s?[a-zA-Z]?(?:\s?[/-]\s?\d+[a-zA-Z]?)*)$"
    ).unwrap();

    /// Two-token "Firstname Lastname" line.
    pub static ref NAME_LINE: Regex = Regex::new(
        r"^(\p{Lu}\p{L}+)\s+(\p{Lu}\p{L}+)$"
    ).unwrap();

    /// Single-line composite: optional name, street + number, postal code + city.
    pub static ref COMPOSITE_ADDRESS: Regex = Regex::new(
        r"(?:(\p{Lu}\p{L}+\s+\p{Lu}\p{L}+)[\s,]+)?((?:\p{Lu}[\p{L}.]*\s+){0,2}(?:\p{Lu}\p{L}*(?i:stra(?:ß|ss)e|platz|weg|gasse|allee|ring)|Stra(?:ß|ss)e|Platz|Weg|Gasse|Allee|Ring|\p{Lu}[\p{L}]*\.))\s+(\d{1,4}\s?[a-zA-Z]?(?:\s?[/-]\s?\d+[a-zA-Z]?)*)[\s,]+(\d{4})\s+(\p{Lu}[\p{L}]*(?:[ -]\p{Lu}[\p{L}]*)*)"
    ).unwrap();

    // Meter-point identifier patterns

    /// Labeled, space-grouped identifier: label, separators, then "AT" and
    /// whitespace-separated alphanumeric groups.
    pub static ref METER_LABELED_GROUPED: Regex = Regex::new(&format!(
        r"(?i:{METER_POINT_LABEL})[\s:.-]*(AT[0-9A-Za-z]*(?:\s+[0-9A-Za-z]+)+)"
    )).unwrap();

    /// Unlabeled, space-grouped identifier anywhere in the text.
    pub static ref METER_AT_GROUPED: Regex = Regex::new(
        r"\b(AT[0-9A-Za-z]*(?:\s+[0-9A-Za-z]+)+)"
    ).unwrap();

    // Consumption patterns

    /// Current-period reading: "aktuell"/"current" qualifier, optional
    /// consumption label, numeric token, "kWh" unit.
    pub static ref CURRENT_CONSUMPTION: Regex = Regex::new(
        r"(?i)\b(?:aktuell\p{L}*|current)\s*:?\s*(?:(?:gesamtverbrauch|energieverbrauch|verbrauch|strom)\p{L}*\s*:?\s*)?(\d+(?:[.,]\d+)*)\s*kWh\b"
    ).unwrap();

    /// Any numeric token followed by "kWh", optionally preceded by a
    /// consumption label.
    pub static ref CONSUMPTION_KWH: Regex = Regex::new(
        r"(?i)(?:(?:gesamtverbrauch|energieverbrauch|verbrauch|strom)\p{L}*\s*:?\s*)?(\d+(?:[.,]\d+)*)\s*kWh\b"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_city_line() {
        assert!(POSTAL_CITY_LINE.is_match("1010 Wien"));
        assert!(POSTAL_CITY_LINE.is_match("5020 Salzburg"));
        assert!(POSTAL_CITY_LINE.is_match("3100 Sankt Pölten"));
        assert!(POSTAL_CITY_LINE.is_match("4600 Wels-Land"));

        // German five-digit codes and bare numbers are not Austrian lines.
        assert!(!POSTAL_CITY_LINE.is_match("10115 Berlin"));
        assert!(!POSTAL_CITY_LINE.is_match("1010"));
        assert!(!POSTAL_CITY_LINE.is_match("1010 wien"));
    }

    #[test]
    fn test_street_line() {
        for line in [
            "Hauptstraße 12",
            "Hauptstrasse 12a",
            "Opernring 2",
            "Linzer Straße 5",
            "Kirchengasse 7/2",
            "Hauptstr. 3",
            "Am Stadtplatz 1",
        ] {
            assert!(STREET_LINE.is_match(line), "should match: {line}");
        }

        assert!(!STREET_LINE.is_match("Max Mustermann"));
        assert!(!STREET_LINE.is_match("1010 Wien"));
        assert!(!STREET_LINE.is_match("Rechnungsnummer 483920"));
    }

    #[test]
    fn test_name_line() {
        assert!(NAME_LINE.is_match("Max Mustermann"));
        assert!(NAME_LINE.is_match("Eva Übelbacher"));
        assert!(!NAME_LINE.is_match("Max"));
        assert!(!NAME_LINE.is_match("Max Mustermann GmbH"));
    }

    #[test]
    fn test_composite_address() {
        let caps = COMPOSITE_ADDRESS
            .captures("Max Mustermann, Hauptstraße 12, 1010 Wien")
            .unwrap();
        assert_eq!(&caps[1], "Max Mustermann");
        assert_eq!(&caps[2], "Hauptstraße");
        assert_eq!(&caps[3], "12");
        assert_eq!(&caps[4], "1010");
        assert_eq!(&caps[5], "Wien");

        let caps = COMPOSITE_ADDRESS
            .captures("Lieferadresse: Opernring 2 1010 Wien")
            .unwrap();
        assert!(caps.get(1).is_none());
        assert_eq!(&caps[2], "Opernring");
    }

    #[test]
    fn test_meter_labeled_grouped() {
        let caps = METER_LABELED_GROUPED
            .captures("Zählpunktnummer: AT 004000 05020 00000 00000 00101 27094")
            .unwrap();
        assert!(caps[1].starts_with("AT"));

        assert!(METER_LABELED_GROUPED.is_match("Zählpunkt-Nr.: AT 004000 05020"));
        assert!(METER_LABELED_GROUPED.is_match("Metering Point AT 004000 05020"));
    }

    #[test]
    fn test_current_consumption() {
        let caps = CURRENT_CONSUMPTION.captures("aktuell: 2.573,1 kWh").unwrap();
        assert_eq!(&caps[1], "2.573,1");

        let caps = CURRENT_CONSUMPTION
            .captures("Aktueller Verbrauch: 2.573,1 kWh")
            .unwrap();
        assert_eq!(&caps[1], "2.573,1");

        assert!(!CURRENT_CONSUMPTION.is_match("Vorperiode: 3.000,0 kWh"));
    }

    #[test]
    fn test_consumption_kwh() {
        let caps = CONSUMPTION_KWH.captures("Gesamtverbrauch 2573 kWh").unwrap();
        assert_eq!(&caps[1], "2573");

        assert!(CONSUMPTION_KWH.is_match("812,5 kWh"));
        assert!(!CONSUMPTION_KWH.is_match("812,5 kW"));
    }
}
