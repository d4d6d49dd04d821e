//! Defensive parsing of AI responses.
//!
//! The model is asked for a bare JSON object but may wrap it in code
//! fences or prose, use other key spellings, quote numbers, or add keys of
//! its own. Each field is validated on its own; a bad field is dropped
//! without discarding the rest.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AdapterError;
use crate::receipt::rules::{parse_date, parse_decimal, Plausibility};

use super::PartialFieldSet;

const DATE_KEYS: &[&str] = &["date", "scanDate", "scan_date", "receiptDate", "receipt_date"];
const QUANTITY_KEYS: &[&str] = &["quantity", "volume", "litres", "liters"];
const PRICE_KEYS: &[&str] = &[
    "pricePerUnit",
    "price_per_unit",
    "unitPrice",
    "unit_price",
    "rate",
];
const STATION_KEYS: &[&str] = &["stationName", "station_name", "station"];
const GRADE_KEYS: &[&str] = &[
    "fuelGrade",
    "fuel_grade",
    "fuelType",
    "fuel_type",
    "fuelGradeText",
    "fuel_grade_text",
    "grade",
];

/// Parse model output into validated fields.
///
/// Fails only when no JSON object can be found at all. An object whose
/// fields are all null or invalid yields an empty set.
pub fn parse_fields(
    content: &str,
    plausibility: &Plausibility,
) -> Result<PartialFieldSet, AdapterError> {
    let object = find_object(content)?;

    let date = lookup(&object, DATE_KEYS)
        .and_then(Value::as_str)
        .and_then(parse_date)
        .filter(|d| plausibility.accepts_date(*d));

    let quantity = lookup(&object, QUANTITY_KEYS)
        .and_then(as_decimal)
        .filter(|q| plausibility.accepts_quantity(*q));

    let price_per_unit = lookup(&object, PRICE_KEYS)
        .and_then(as_decimal)
        .filter(|p| plausibility.accepts_unit_price(*p));

    let station_name = lookup(&object, STATION_KEYS).and_then(as_text);
    let fuel_grade_text = lookup(&object, GRADE_KEYS).and_then(as_text);

    let fields = PartialFieldSet {
        date,
        quantity,
        price_per_unit,
        station_name,
        fuel_grade_text,
    };

    debug!("AI response yielded {} valid fields", fields.len());
    Ok(fields)
}

/// Locate the JSON object in the model text.
fn find_object(content: &str) -> Result<Map<String, Value>, AdapterError> {
    let stripped = strip_code_fences(content);

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(stripped) {
        return Ok(map);
    }

    // Prose around the object: take the outermost braces.
    if let (Some(start), Some(end)) = (stripped.find('{'), stripped.rfind('}')) {
        if start < end {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&stripped[start..=end]) {
                return Ok(map);
            }
        }
    }

    Err(AdapterError::MalformedResponse(format!(
        "no JSON object in response: {:?}",
        truncate(content, 80)
    )))
}

fn strip_code_fences(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag on the opening fence.
        text = rest.split_once('\n').map_or("", |(_, body)| body);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find(|v| !v.is_null())
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => {
            // parse_decimal ignores signs; a negative amount is invalid.
            if s.trim_start().starts_with('-') {
                None
            } else {
                parse_decimal(s)
            }
        }
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::config::ExtractionConfig;

    fn plausibility() -> Plausibility {
        Plausibility::with_reference_date(
            &ExtractionConfig::default(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    #[test]
    fn test_plain_object() {
        let fields = parse_fields(
            r#"{"date":"2024-03-12","quantity":10.5,"pricePerUnit":1.42,"stationName":"Shell","fuelType":"Diesel"}"#,
            &plausibility(),
        )
        .unwrap();

        assert_eq!(
            fields,
            PartialFieldSet {
                date: NaiveDate::from_ymd_opt(2024, 3, 12),
                quantity: Some(Decimal::new(105, 1)),
                price_per_unit: Some(Decimal::new(142, 2)),
                station_name: Some("Shell".to_string()),
                fuel_grade_text: Some("Diesel".to_string()),
            }
        );
    }

    #[test]
    fn test_code_fences_and_prose() {
        let fenced = "```json\n{\"quantity\": 8.0}\n```";
        assert_eq!(
            parse_fields(fenced, &plausibility()).unwrap().quantity,
            Some(Decimal::new(80, 1))
        );

        let prose = "Here is the data you asked for: {\"price_per_unit\": \"1.50\"} Hope it helps.";
        assert_eq!(
            parse_fields(prose, &plausibility()).unwrap().price_per_unit,
            Some(Decimal::new(150, 2))
        );
    }

    #[test]
    fn test_invalid_fields_dropped_individually() {
        let fields = parse_fields(
            r#"{"date":"2015-01-01","quantity":-3,"pricePerUnit":"-1.50","stationName":"  ","fuelType":"Premium","confidence":0.99,"totalAmount":42}"#,
            &plausibility(),
        )
        .unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields.fuel_grade_text.as_deref(), Some("Premium"));
    }

    #[test]
    fn test_wrong_types_dropped() {
        let fields = parse_fields(
            r#"{"date":20240312,"quantity":"ten","stationName":42,"pricePerUnit":null}"#,
            &plausibility(),
        )
        .unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_no_object_is_malformed() {
        let err = parse_fields("I could not read this receipt.", &plausibility()).unwrap_err();
        assert!(matches!(err, AdapterError::MalformedResponse(_)));

        let err = parse_fields("[1, 2, 3]", &plausibility()).unwrap_err();
        assert!(matches!(err, AdapterError::MalformedResponse(_)));
    }
}
