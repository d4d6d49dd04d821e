//! Heuristic field parser over recognized text fragments.

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::receipt::FieldKind;
use crate::ocr::{in_reading_order, TextFragment};

use super::candidates::CandidateSet;
use super::rules::{matchers_for, FieldMatcher, Plausibility};

/// Rule-based parser producing at most one candidate per field kind.
///
/// For each kind the matchers are tried in priority order against every
/// fragment, top of the receipt first; the first hit wins. Kinds are
/// resolved independently, so different fields may come from different
/// fragments.
#[derive(Debug, Clone)]
pub struct HeuristicParser {
    plausibility: Plausibility,
    matchers: Vec<(FieldKind, Vec<FieldMatcher>)>,
}

impl HeuristicParser {
    /// Create a parser with today's date as the reference for date checks.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self::with_plausibility(Plausibility::from_config(config))
    }

    /// Create a parser with explicit range checks.
    pub fn with_plausibility(plausibility: Plausibility) -> Self {
        let matchers = FieldKind::ALL
            .iter()
            .map(|kind| (*kind, matchers_for(*kind)))
            .collect();
        Self {
            plausibility,
            matchers,
        }
    }

    pub fn plausibility(&self) -> &Plausibility {
        &self.plausibility
    }

    /// Parse fragments into heuristic candidates.
    pub fn parse(&self, fragments: &[TextFragment]) -> CandidateSet {
        let ordered = in_reading_order(fragments);
        let mut candidates = CandidateSet::new();

        for (kind, matchers) in &self.matchers {
            let found = matchers.iter().find_map(|matcher| {
                ordered.iter().find_map(|fragment| {
                    let candidate = matcher.apply(&fragment.content, &self.plausibility)?;
                    debug!(
                        "{} matched by {} on {:?}: {:?}",
                        kind,
                        matcher.name(),
                        fragment.content,
                        candidate.confidence
                    );
                    Some(candidate)
                })
            });

            if let Some(candidate) = found {
                candidates.insert(candidate);
            }
        }

        info!(
            "Heuristic pass found {} of {} fields in {} fragments",
            candidates.len(),
            FieldKind::ALL.len(),
            fragments.len()
        );

        candidates
    }
}

impl Default for HeuristicParser {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::receipt::{CandidateSource, Confidence, FieldValue};

    fn parser() -> HeuristicParser {
        HeuristicParser::with_plausibility(Plausibility::with_reference_date(
            &ExtractionConfig::default(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ))
    }

    fn fragments(lines: &[&str]) -> Vec<TextFragment> {
        TextFragment::from_lines(lines.iter().copied())
    }

    #[test]
    fn test_parse_basic_receipt() {
        let candidates = parser().parse(&fragments(&[
            "12/03/2024",
            "STATION: Shell",
            "QTY 10.5 L",
            "RATE $1.42/L",
        ]));

        assert_eq!(candidates.len(), 4);
        assert!(!candidates.contains(FieldKind::FuelGradeText));

        let date = candidates.get(FieldKind::ScanDate).unwrap();
        assert_eq!(
            date.value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap())
        );

        let quantity = candidates.get(FieldKind::Quantity).unwrap();
        assert_eq!(quantity.value, FieldValue::Number(Decimal::from_str("10.5").unwrap()));
        assert_eq!(quantity.confidence, Confidence::High);

        let price = candidates.get(FieldKind::PricePerUnit).unwrap();
        assert_eq!(price.value, FieldValue::Number(Decimal::from_str("1.42").unwrap()));

        let station = candidates.get(FieldKind::StationName).unwrap();
        assert_eq!(station.value, FieldValue::Text("Shell".to_string()));

        assert!(candidates.iter().all(|c| c.source == CandidateSource::Heuristic));
    }

    #[test]
    fn test_top_most_date_wins() {
        let candidates = parser().parse(&[
            TextFragment::new("Printed 20/05/2024", 9),
            TextFragment::new("DATE 12/03/2024", 1),
        ]);
        assert_eq!(
            candidates.get(FieldKind::ScanDate).unwrap().value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap())
        );
    }

    #[test]
    fn test_matcher_priority_beats_position() {
        // The labeled quantity sits higher, but number+unit has priority.
        let candidates = parser().parse(&fragments(&["QTY: 7", "Volume dispensed 10.50 L"]));
        let quantity = candidates.get(FieldKind::Quantity).unwrap();
        assert_eq!(quantity.value, FieldValue::Number(Decimal::from_str("10.50").unwrap()));
        assert_eq!(quantity.confidence, Confidence::High);
    }

    #[test]
    fn test_labeled_station_beats_header_line() {
        let candidates = parser().parse(&fragments(&[
            "Sunrise Filling Centre",
            "Outlet: Sunrise Fuels Pvt Ltd",
        ]));
        let station = candidates.get(FieldKind::StationName).unwrap();
        assert_eq!(station.value, FieldValue::Text("Sunrise Fuels Pvt Ltd".to_string()));
        assert_eq!(station.confidence, Confidence::Medium);
    }

    #[test]
    fn test_header_station_is_low_confidence() {
        let candidates = parser().parse(&fragments(&["Sunrise Filling Centre", "TAX INVOICE"]));
        let station = candidates.get(FieldKind::StationName).unwrap();
        assert_eq!(station.confidence, Confidence::Low);
    }

    #[test]
    fn test_total_never_becomes_unit_price() {
        let candidates = parser().parse(&fragments(&["TOTAL $14.91", "AMOUNT 14.91"]));
        assert!(!candidates.contains(FieldKind::PricePerUnit));
    }

    #[test]
    fn test_huge_receipt_age_does_not_overflow() {
        let config = ExtractionConfig {
            max_receipt_age_days: 1_000_000_000,
            ..ExtractionConfig::default()
        };
        let parser = HeuristicParser::with_plausibility(Plausibility::with_reference_date(
            &config,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));

        let candidates = parser.parse(&fragments(&["12/03/2024"]));
        assert_eq!(
            candidates.get(FieldKind::ScanDate).unwrap().value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap())
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parser().parse(&[]).is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let candidates = parser().parse(&fragments(&["qty 10.5 l", "rate rs 95.50/ltr", "hsd"]));
        assert!(candidates.contains(FieldKind::Quantity));
        assert!(candidates.contains(FieldKind::PricePerUnit));
        assert_eq!(
            candidates.get(FieldKind::FuelGradeText).unwrap().raw_value,
            "hsd"
        );
    }
}
