//! Station name extraction.

use crate::models::receipt::{Confidence, FieldKind, FieldValue};

use super::patterns::{GRADE_DIESEL, GRADE_GENERIC, GRADE_PREMIUM, HEADER_KEYWORD, STATION_LABELED};
use super::{FieldMatcher, Hit, Plausibility};

/// Known fuel brands and the spellings printed on their receipts.
const KNOWN_BRANDS: &[(&[&str], &str)] = &[
    (&["INDIAN OIL", "IOCL"], "Indian Oil"),
    (&["HINDUSTAN PETROLEUM", "HPCL", "HP PETROL"], "HP"),
    (&["BHARAT PETROLEUM", "BPCL"], "Bharat Petroleum"),
    (&["SHELL"], "Shell"),
    (&["RELIANCE"], "Reliance"),
    (&["NAYARA", "ESSAR"], "Nayara Energy"),
    (&["TOTALENERGIES", "TOTAL ENERGIES"], "TotalEnergies"),
    (&["BRITISH PETROLEUM", "BP"], "BP"),
    (&["EXXON", "MOBIL"], "ExxonMobil"),
    (&["CHEVRON"], "Chevron"),
];

/// Station matchers, highest priority first.
///
/// The header-line fallback is the weakest heuristic on the receipt and is
/// the only matcher that yields Low confidence.
pub fn matchers() -> Vec<FieldMatcher> {
    vec![
        FieldMatcher::new(FieldKind::StationName, "labeled_station", labeled_station),
        FieldMatcher::new(FieldKind::StationName, "known_brand", known_brand),
        FieldMatcher::new(FieldKind::StationName, "header_line", header_line),
    ]
}

/// `STATION: Shell`, `Outlet - Sunrise Fuels`.
fn labeled_station(text: &str, _plausibility: &Plausibility) -> Option<Hit> {
    let caps = STATION_LABELED.captures(text)?;
    let name = clean_name(&caps[1]);
    if !name.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(Hit::new(
        caps[1].trim(),
        FieldValue::Text(name),
        Confidence::Medium,
    ))
}

/// Canonical brand name for a known brand mention.
fn known_brand(text: &str, _plausibility: &Plausibility) -> Option<Hit> {
    // Whole-word comparison so that "MOBILE:" is not read as Mobil.
    let words: String = text
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let padded = format!(" {} ", words.split_whitespace().collect::<Vec<_>>().join(" "));

    KNOWN_BRANDS.iter().find_map(|(keywords, name)| {
        keywords
            .iter()
            .find(|k| padded.contains(&format!(" {} ", k)))
            .map(|_| Hit::new(text.trim(), FieldValue::Text(name.to_string()), Confidence::Medium))
    })
}

/// First line that is neither numeric nor a known receipt keyword.
fn header_line(text: &str, _plausibility: &Plausibility) -> Option<Hit> {
    let trimmed = text.trim();
    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();

    if letters < 3 || digits * 2 > letters {
        return None;
    }
    if HEADER_KEYWORD.is_match(trimmed)
        || GRADE_PREMIUM.is_match(trimmed)
        || GRADE_DIESEL.is_match(trimmed)
        || GRADE_GENERIC.is_match(trimmed)
    {
        return None;
    }

    Some(Hit::new(
        trimmed,
        FieldValue::Text(clean_name(trimmed)),
        Confidence::Low,
    ))
}

fn clean_name(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| !c.is_alphanumeric() && c != ')' && c != '&')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station_of(text: &str) -> Option<(String, Confidence)> {
        let p = Plausibility::default();
        matchers().iter().find_map(|m| m.apply(text, &p)).map(|c| {
            (
                c.value.as_text().unwrap_or_default().to_string(),
                c.confidence,
            )
        })
    }

    #[test]
    fn test_labeled_station() {
        assert_eq!(
            station_of("STATION: Shell"),
            Some(("Shell".to_string(), Confidence::Medium))
        );
        assert_eq!(
            station_of("Outlet - Sunrise Fuels  "),
            Some(("Sunrise Fuels".to_string(), Confidence::Medium))
        );
    }

    #[test]
    fn test_known_brand() {
        assert_eq!(
            station_of("WELCOME TO IOCL"),
            Some(("Indian Oil".to_string(), Confidence::Medium))
        );
        let p = Plausibility::default();
        assert!(known_brand("Mobile: 9876543210", &p).is_none());
        assert!(known_brand("bp connect", &p).is_some());
    }

    #[test]
    fn test_header_line_is_low() {
        assert_eq!(
            station_of("Sunrise Filling Centre"),
            Some(("Sunrise Filling Centre".to_string(), Confidence::Low))
        );
    }

    #[test]
    fn test_header_line_skips_keywords_and_numbers() {
        let p = Plausibility::default();
        assert!(header_line("TAX INVOICE", &p).is_none());
        assert!(header_line("12/03/2024", &p).is_none());
        assert!(header_line("Premium Unleaded", &p).is_none());
        assert!(header_line("**", &p).is_none());
    }
}
