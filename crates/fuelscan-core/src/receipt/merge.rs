//! Merging heuristic and AI candidates into the final result.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::{
    CandidateField, CandidateSource, Confidence, FieldKind, FuelGrade, ScanMethod,
    ScannedReceiptResult,
};

use super::candidates::CandidateSet;
use super::rules::{parse_date, parse_decimal, round_currency, round_volume};

/// Combines candidates per field and normalizes the winners.
///
/// A heuristic candidate beats an AI candidate for the same field. With
/// `prefer_ai_over_weak_heuristics` a Low-confidence heuristic candidate
/// yields to a Medium-or-better AI one instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultMerger {
    prefer_ai_over_weak_heuristics: bool,
}

impl ResultMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            prefer_ai_over_weak_heuristics: config.prefer_ai_over_weak_heuristics,
        }
    }

    pub fn with_ai_over_weak_heuristics(mut self, enabled: bool) -> Self {
        self.prefer_ai_over_weak_heuristics = enabled;
        self
    }

    /// Merge both candidate sets into one result.
    pub fn merge(&self, heuristic: &CandidateSet, ai: &CandidateSet) -> ScannedReceiptResult {
        let mut sources: Vec<CandidateSource> = Vec::new();

        let date = self.resolve(FieldKind::ScanDate, heuristic, ai, &mut sources, |c| {
            c.value.as_date().or_else(|| parse_date(&c.raw_value))
        });
        let quantity = self.resolve(FieldKind::Quantity, heuristic, ai, &mut sources, |c| {
            c.value
                .as_number()
                .or_else(|| parse_decimal(&c.raw_value))
                .map(round_volume)
        });
        let price_per_unit = self.resolve(FieldKind::PricePerUnit, heuristic, ai, &mut sources, |c| {
            c.value
                .as_number()
                .or_else(|| parse_decimal(&c.raw_value))
                .map(round_currency)
        });
        let station_name = self.resolve(FieldKind::StationName, heuristic, ai, &mut sources, |c| {
            c.value.as_text().and_then(non_blank)
        });
        let fuel_grade = self.resolve(FieldKind::FuelGradeText, heuristic, ai, &mut sources, |c| {
            c.value.as_text().and_then(non_blank).map(|t| FuelGrade::classify(&t))
        });

        let method = if sources.contains(&CandidateSource::Heuristic) {
            ScanMethod::Ocr
        } else if sources.is_empty() {
            ScanMethod::None
        } else {
            ScanMethod::Ai
        };

        ScannedReceiptResult::new(date, quantity, price_per_unit, station_name, fuel_grade, method)
    }

    /// Candidates for a field, in the order they should be tried.
    fn ordered<'a>(
        &self,
        kind: FieldKind,
        heuristic: &'a CandidateSet,
        ai: &'a CandidateSet,
    ) -> Vec<&'a CandidateField> {
        let h = heuristic.get(kind);
        let a = ai.get(kind);

        let ai_first = self.prefer_ai_over_weak_heuristics
            && matches!((h, a), (Some(h), Some(a)) if h.confidence == Confidence::Low && a.confidence >= Confidence::Medium);

        let order = if ai_first { [a, h] } else { [h, a] };
        order.into_iter().flatten().collect()
    }

    /// First candidate that normalizes cleanly wins; its source is recorded.
    fn resolve<T>(
        &self,
        kind: FieldKind,
        heuristic: &CandidateSet,
        ai: &CandidateSet,
        sources: &mut Vec<CandidateSource>,
        normalize: impl Fn(&CandidateField) -> Option<T>,
    ) -> Option<T> {
        for candidate in self.ordered(kind, heuristic, ai) {
            if let Some(value) = normalize(candidate) {
                sources.push(candidate.source);
                return Some(value);
            }
            debug!("Dropping {:?} {} candidate {:?}", candidate.source, kind, candidate.raw_value);
        }
        None
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::receipt::FieldValue;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn heuristic_text(kind: FieldKind, text: &str, confidence: Confidence) -> CandidateField {
        CandidateField::heuristic(kind, text, FieldValue::Text(text.to_string()), confidence)
    }

    fn ai_text(kind: FieldKind, text: &str) -> CandidateField {
        CandidateField::ai(kind, text, FieldValue::Text(text.to_string()))
    }

    #[test]
    fn test_heuristic_beats_ai() {
        let heuristic: CandidateSet = [heuristic_text(
            FieldKind::StationName,
            "Sunrise Fuels",
            Confidence::Low,
        )]
        .into_iter()
        .collect();
        let ai: CandidateSet = [ai_text(FieldKind::StationName, "Shell")].into_iter().collect();

        let result = ResultMerger::new().merge(&heuristic, &ai);
        assert_eq!(result.station_name(), Some("Sunrise Fuels"));
        assert_eq!(result.method(), ScanMethod::Ocr);
    }

    #[test]
    fn test_weak_heuristic_yields_when_enabled() {
        let heuristic: CandidateSet = [heuristic_text(
            FieldKind::StationName,
            "Sunrise Fuels",
            Confidence::Low,
        )]
        .into_iter()
        .collect();
        let ai: CandidateSet = [ai_text(FieldKind::StationName, "Shell")].into_iter().collect();

        let result = ResultMerger::new()
            .with_ai_over_weak_heuristics(true)
            .merge(&heuristic, &ai);
        assert_eq!(result.station_name(), Some("Shell"));
        assert_eq!(result.method(), ScanMethod::Ai);
    }

    #[test]
    fn test_ai_fills_gaps() {
        let heuristic: CandidateSet = [CandidateField::heuristic(
            FieldKind::ScanDate,
            "12/03/2024",
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()),
            Confidence::Medium,
        )]
        .into_iter()
        .collect();
        let ai: CandidateSet = [
            CandidateField::ai(FieldKind::Quantity, "8.0", FieldValue::Number(dec("8.0"))),
            CandidateField::ai(FieldKind::PricePerUnit, "1.499", FieldValue::Number(dec("1.499"))),
        ]
        .into_iter()
        .collect();

        let result = ResultMerger::new().merge(&heuristic, &ai);
        assert_eq!(result.field_count(), 3);
        assert_eq!(result.quantity(), Some(dec("8")));
        assert_eq!(result.price_per_unit(), Some(dec("1.50")));
        assert_eq!(result.method(), ScanMethod::Ocr);
    }

    #[test]
    fn test_ai_only_method() {
        let ai: CandidateSet = [CandidateField::ai(
            FieldKind::Quantity,
            "8.0",
            FieldValue::Number(dec("8.0")),
        )]
        .into_iter()
        .collect();
        let result = ResultMerger::new().merge(&CandidateSet::new(), &ai);
        assert_eq!(result.method(), ScanMethod::Ai);
    }

    #[test]
    fn test_unit_price_keeps_two_decimals() {
        let ai: CandidateSet = [CandidateField::ai(
            FieldKind::PricePerUnit,
            "1.5",
            FieldValue::Number(dec("1.5")),
        )]
        .into_iter()
        .collect();
        let result = ResultMerger::new().merge(&CandidateSet::new(), &ai);
        assert_eq!(result.price_per_unit().unwrap().to_string(), "1.50");
    }

    #[test]
    fn test_empty_is_none() {
        let result = ResultMerger::new().merge(&CandidateSet::new(), &CandidateSet::new());
        assert!(result.is_empty());
        assert_eq!(result.method(), ScanMethod::None);
    }

    #[test]
    fn test_grade_classified_or_absent() {
        let merger = ResultMerger::new();
        for (text, grade) in [
            ("Premium Unleaded", FuelGrade::Premium),
            ("HSD/Diesel", FuelGrade::Diesel),
            ("Petrol Regular", FuelGrade::Regular),
        ] {
            let heuristic: CandidateSet = [heuristic_text(
                FieldKind::FuelGradeText,
                text,
                Confidence::Medium,
            )]
            .into_iter()
            .collect();
            assert_eq!(merger.merge(&heuristic, &CandidateSet::new()).fuel_grade(), Some(grade));
        }

        let result = merger.merge(&CandidateSet::new(), &CandidateSet::new());
        assert_eq!(result.fuel_grade(), None);
    }

    #[test]
    fn test_unnormalizable_heuristic_falls_back_to_ai() {
        let heuristic: CandidateSet = [heuristic_text(
            FieldKind::StationName,
            "   ",
            Confidence::Low,
        )]
        .into_iter()
        .collect();
        let ai: CandidateSet = [ai_text(FieldKind::StationName, "Shell")].into_iter().collect();

        let result = ResultMerger::new().merge(&heuristic, &ai);
        assert_eq!(result.station_name(), Some("Shell"));
        assert_eq!(result.method(), ScanMethod::Ai);
    }
}
