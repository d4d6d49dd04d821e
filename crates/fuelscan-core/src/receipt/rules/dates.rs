//! Date extraction for fuel receipts.

use chrono::NaiveDate;

use crate::models::receipt::{Confidence, FieldKind, FieldValue};

use super::patterns::{DATE_DMY, DATE_LABEL, DATE_TEXT_MONTH, DATE_YMD};
use super::{FieldMatcher, Hit, Plausibility};

/// A date found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub date: NaiveDate,
    pub source: String,
    pub start: usize,
}

/// Date token extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// First date in the text, by position.
    pub fn extract(&self, text: &str) -> Option<DateMatch> {
        self.extract_all(text).into_iter().next()
    }

    /// All dates in the text, ordered by where they start.
    pub fn extract_all(&self, text: &str) -> Vec<DateMatch> {
        let mut results: Vec<DateMatch> = Vec::new();

        // YYYY-MM-DD or YYYY/MM/DD
        for caps in DATE_YMD.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);

            if let (Some(date), Some(m)) = (NaiveDate::from_ymd_opt(year, month, day), caps.get(0)) {
                results.push(DateMatch {
                    date,
                    source: m.as_str().to_string(),
                    start: m.start(),
                });
            }
        }

        // DD/MM/YYYY, DD-MM-YY, DD.MM.YYYY; month-first when day-first is impossible
        for caps in DATE_DMY.captures_iter(text) {
            let first: u32 = caps[1].parse().unwrap_or(0);
            let second: u32 = caps[2].parse().unwrap_or(0);
            let year = parse_year(&caps[3]);

            let date = NaiveDate::from_ymd_opt(year, second, first)
                .or_else(|| NaiveDate::from_ymd_opt(year, first, second));

            if let (Some(date), Some(m)) = (date, caps.get(0)) {
                if results.iter().any(|r| r.start == m.start()) {
                    continue;
                }
                results.push(DateMatch {
                    date,
                    source: m.as_str().to_string(),
                    start: m.start(),
                });
            }
        }

        // 12 Mar 2024, 12-MARCH-24
        for caps in DATE_TEXT_MONTH.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = month_to_number(&caps[2]);
            let year = parse_year(&caps[3]);

            if let (Some(date), Some(m)) = (NaiveDate::from_ymd_opt(year, month, day), caps.get(0)) {
                results.push(DateMatch {
                    date,
                    source: m.as_str().to_string(),
                    start: m.start(),
                });
            }
        }

        results.sort_by_key(|r| r.start);
        results
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a standalone date value, e.g. one returned by the AI service.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateExtractor::new().extract(trimmed).map(|m| m.date))
}

/// Matchers for the scan date. A single matcher covers every format so
/// that the top-most date on the receipt wins, not the most specific one.
pub fn matchers() -> Vec<FieldMatcher> {
    vec![FieldMatcher::new(FieldKind::ScanDate, "date_token", find_date)]
}

fn find_date(text: &str, plausibility: &Plausibility) -> Option<Hit> {
    let found = DateExtractor::new()
        .extract_all(text)
        .into_iter()
        .find(|m| plausibility.accepts_date(m.date))?;

    let confidence = if DATE_LABEL.is_match(text) {
        Confidence::High
    } else {
        Confidence::Medium
    };

    Some(Hit::new(found.source, FieldValue::Date(found.date), confidence))
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Receipts are recent: two-digit years are 20xx.
        2000 + year
    } else {
        year
    }
}

fn month_to_number(month: &str) -> u32 {
    match month.to_uppercase().as_str() {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ExtractionConfig;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plausibility() -> Plausibility {
        Plausibility::with_reference_date(&ExtractionConfig::default(), ymd(2024, 6, 1))
    }

    #[test]
    fn test_extract_day_first() {
        let result = DateExtractor::new().extract("12/03/2024");
        assert_eq!(result.unwrap().date, ymd(2024, 3, 12));
    }

    #[test]
    fn test_extract_month_first_fallback() {
        let result = DateExtractor::new().extract("03/25/2024");
        assert_eq!(result.unwrap().date, ymd(2024, 3, 25));
    }

    #[test]
    fn test_extract_iso_and_text_month() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.extract("2024-03-12").unwrap().date, ymd(2024, 3, 12));
        assert_eq!(extractor.extract("12 Mar 2024").unwrap().date, ymd(2024, 3, 12));
        assert_eq!(extractor.extract("Dt: 05-APR-24").unwrap().date, ymd(2024, 4, 5));
    }

    #[test]
    fn test_two_digit_year() {
        let result = DateExtractor::new().extract("15.01.24");
        assert_eq!(result.unwrap().date, ymd(2024, 1, 15));
    }

    #[test]
    fn test_find_date_confidence() {
        let p = plausibility();
        let labeled = find_date("DATE: 12/03/2024 10:41", &p).unwrap();
        assert_eq!(labeled.confidence, Confidence::High);
        assert_eq!(labeled.raw, "12/03/2024");

        let bare = find_date("12/03/2024", &p).unwrap();
        assert_eq!(bare.confidence, Confidence::Medium);
    }

    #[test]
    fn test_find_date_rejects_implausible() {
        let p = plausibility();
        assert!(find_date("31/12/2030", &p).is_none());
        assert!(find_date("01/01/2001", &p).is_none());
    }

    #[test]
    fn test_parse_date_value() {
        assert_eq!(parse_date("2024-03-12"), Some(ymd(2024, 3, 12)));
        assert_eq!(parse_date(" 12/03/2024 "), Some(ymd(2024, 3, 12)));
        assert_eq!(parse_date("yesterday"), None);
    }
}
