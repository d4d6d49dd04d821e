//! Pre-filling a fuel entry form from a scan result.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::receipt::{FuelGrade, ScannedReceiptResult};
use crate::receipt::rules::round_currency;

/// Editable state of a fuel entry form.
///
/// Values here belong to the user. A scan only fills what is still empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelEntryDraft {
    pub date: Option<NaiveDate>,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<Decimal>,
    pub station_name: Option<String>,
    pub fuel_grade: Option<FuelGrade>,
}

impl FuelEntryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill empty fields from `result`; returns how many were filled.
    pub fn apply_scan(&mut self, result: ScannedReceiptResult) -> usize {
        let (date, quantity, price_per_unit, station_name, fuel_grade) = result.into_parts();

        let station_empty = self
            .station_name
            .as_deref()
            .is_none_or(|s| s.trim().is_empty());

        let filled = [
            fill(&mut self.date, date),
            fill(&mut self.quantity, quantity),
            fill(&mut self.price_per_unit, price_per_unit),
            station_empty && station_name.is_some() && {
                self.station_name = station_name;
                true
            },
            fill(&mut self.fuel_grade, fuel_grade),
        ]
        .into_iter()
        .filter(|f| *f)
        .count();

        debug!("Scan filled {} empty form fields", filled);
        filled
    }

    /// Quantity times unit price, rounded to cents.
    pub fn total_cost(&self) -> Option<Decimal> {
        Some(round_currency(self.quantity? * self.price_per_unit?))
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    if slot.is_some() || value.is_none() {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::receipt::ScanMethod;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scan() -> ScannedReceiptResult {
        ScannedReceiptResult::new(
            NaiveDate::from_ymd_opt(2024, 3, 12),
            Some(dec("10.5")),
            Some(dec("1.42")),
            Some("Shell".to_string()),
            Some(FuelGrade::Premium),
            ScanMethod::Ocr,
        )
    }

    #[test]
    fn test_fills_empty_draft() {
        let mut draft = FuelEntryDraft::new();
        assert_eq!(draft.apply_scan(scan()), 5);
        assert_eq!(draft.station_name.as_deref(), Some("Shell"));
        assert_eq!(draft.total_cost(), Some(dec("14.91")));
    }

    #[test]
    fn test_never_overwrites_user_values() {
        let mut draft = FuelEntryDraft {
            quantity: Some(dec("40")),
            station_name: Some("My usual pump".to_string()),
            ..Default::default()
        };

        assert_eq!(draft.apply_scan(scan()), 3);
        assert_eq!(draft.quantity, Some(dec("40")));
        assert_eq!(draft.station_name.as_deref(), Some("My usual pump"));
        assert_eq!(draft.price_per_unit, Some(dec("1.42")));
    }

    #[test]
    fn test_blank_station_counts_as_empty() {
        let mut draft = FuelEntryDraft {
            station_name: Some("   ".to_string()),
            ..Default::default()
        };
        draft.apply_scan(scan());
        assert_eq!(draft.station_name.as_deref(), Some("Shell"));
    }

    #[test]
    fn test_empty_scan_changes_nothing() {
        let mut draft = FuelEntryDraft {
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        let before = draft.clone();
        assert_eq!(draft.apply_scan(ScannedReceiptResult::empty()), 0);
        assert_eq!(draft, before);
        assert_eq!(draft.total_cost(), None);
    }
}
