//! Address-type classification
//!
//! The production classifier is an external model; the pipeline only sees
//! the [`AddressClassifier`] trait and one of six labels. The classifiers in
//! this module are stand-ins for callers that already know the address type
//! or need a rule-based fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::location_resolver::parse_coordinates;

/// Address type produced by a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressLabel {
    #[serde(rename = "City")]
    City,
    #[serde(rename = "GPS Coordinates")]
    GpsCoordinates,
    #[serde(rename = "Town")]
    Town,
    #[serde(rename = "Zip Code")]
    ZipCode,
    #[serde(rename = "Country")]
    Country,
    #[serde(rename = "Landmarks")]
    Landmarks,
    /// Anything a classifier emits outside the fixed label set
    #[serde(other)]
    Unknown,
}

impl AddressLabel {
    pub const ALL: [AddressLabel; 6] = [
        AddressLabel::City,
        AddressLabel::GpsCoordinates,
        AddressLabel::Town,
        AddressLabel::ZipCode,
        AddressLabel::Country,
        AddressLabel::Landmarks,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressLabel::City => "City",
            AddressLabel::GpsCoordinates => "GPS Coordinates",
            AddressLabel::Town => "Town",
            AddressLabel::ZipCode => "Zip Code",
            AddressLabel::Country => "Country",
            AddressLabel::Landmarks => "Landmarks",
            AddressLabel::Unknown => "Unknown",
        }
    }

    /// Map a raw label string; unrecognized text becomes [`AddressLabel::Unknown`]
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(AddressLabel::Unknown)
    }
}

impl fmt::Display for AddressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressLabel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

/// Maps an input string to exactly one address label
pub trait AddressClassifier: Send + Sync {
    fn classify(&self, text: &str) -> AddressLabel;
}

/// Always answers with the same label
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier(pub AddressLabel);

impl AddressClassifier for FixedClassifier {
    fn classify(&self, _text: &str) -> AddressLabel {
        self.0
    }
}

/// Rule-based classifier: coordinates, then postal-code shape, otherwise a city name
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl AddressClassifier for HeuristicClassifier {
    fn classify(&self, text: &str) -> AddressLabel {
        let text = text.trim();

        if parse_coordinates(text).is_some() {
            return AddressLabel::GpsCoordinates;
        }

        if is_postal_code(text) {
            return AddressLabel::ZipCode;
        }

        AddressLabel::City
    }
}

/// Check if input looks like a postal code
fn is_postal_code(input: &str) -> bool {
    let normalized = input.replace([' ', '-'], "");

    // US ZIP codes: 5 or 9 digits
    if normalized.len() == 5 || normalized.len() == 9 {
        return normalized.chars().all(|c| c.is_ascii_digit());
    }

    // Country prefix followed by an alphanumeric code containing digits
    if (5..=10).contains(&normalized.len()) && normalized.is_ascii() {
        let (prefix, suffix) = normalized.split_at(2);
        return prefix.chars().all(|c| c.is_ascii_alphabetic())
            && suffix.chars().all(|c| c.is_ascii_alphanumeric())
            && suffix.chars().any(|c| c.is_ascii_digit());
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("City", AddressLabel::City)]
    #[case("GPS Coordinates", AddressLabel::GpsCoordinates)]
    #[case("zip code", AddressLabel::ZipCode)]
    #[case(" Landmarks ", AddressLabel::Landmarks)]
    #[case("Country", AddressLabel::Country)]
    #[case("Planet", AddressLabel::Unknown)]
    fn test_label_parsing(#[case] raw: &str, #[case] expected: AddressLabel) {
        assert_eq!(AddressLabel::from_label(raw), expected);
        assert_eq!(raw.parse::<AddressLabel>().unwrap(), expected);
    }

    #[test]
    fn test_label_serde_uses_display_names() {
        let json = serde_json::to_string(&AddressLabel::GpsCoordinates).unwrap();
        assert_eq!(json, "\"GPS Coordinates\"");

        let parsed: AddressLabel = serde_json::from_str("\"Zip Code\"").unwrap();
        assert_eq!(parsed, AddressLabel::ZipCode);

        let unknown: AddressLabel = serde_json::from_str("\"Street\"").unwrap();
        assert_eq!(unknown, AddressLabel::Unknown);
    }

    #[rstest]
    #[case("46.8182,8.2275", AddressLabel::GpsCoordinates)]
    #[case("-33.86 151.21", AddressLabel::GpsCoordinates)]
    #[case("10001", AddressLabel::ZipCode)]
    #[case("123456789", AddressLabel::ZipCode)]
    #[case("CH-8001", AddressLabel::ZipCode)]
    #[case("SW1A 1AA", AddressLabel::ZipCode)]
    #[case("Interlaken", AddressLabel::City)]
    #[case("New York City", AddressLabel::City)]
    #[case("91.0,8.0", AddressLabel::City)]
    fn test_heuristic_classifier(#[case] input: &str, #[case] expected: AddressLabel) {
        assert_eq!(HeuristicClassifier.classify(input), expected);
    }

    #[test]
    fn test_fixed_classifier_ignores_input() {
        let classifier = FixedClassifier(AddressLabel::Landmarks);
        assert_eq!(classifier.classify("10001"), AddressLabel::Landmarks);
    }

    #[test]
    fn test_postal_code_detection() {
        assert!(is_postal_code("12345"));
        assert!(!is_postal_code("1234"));
        assert!(!is_postal_code("12345678901"));
        assert!(!is_postal_code("Interlaken"));
        assert!(!is_postal_code("46.8182"));
    }
}
