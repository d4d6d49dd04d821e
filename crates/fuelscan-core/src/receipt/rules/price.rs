//! Price-per-unit extraction.
//!
//! Every matcher here requires a per-unit qualifier (`/L`, `per ltr`,
//! `RATE`, `UNIT PRICE`). A bare currency amount is a total, not a unit
//! price, and is never picked up.

use regex::Regex;

use crate::models::receipt::{Confidence, FieldKind, FieldValue};

use super::numbers::parse_decimal;
use super::patterns::{PRICE_CURRENCY_PER_UNIT, PRICE_LABELED, PRICE_PER_UNIT_SUFFIX};
use super::{FieldMatcher, Hit, Plausibility};

/// Price matchers, highest priority first.
pub fn matchers() -> Vec<FieldMatcher> {
    vec![
        FieldMatcher::new(FieldKind::PricePerUnit, "currency_per_unit", currency_per_unit),
        FieldMatcher::new(FieldKind::PricePerUnit, "number_per_unit", number_per_unit),
        FieldMatcher::new(FieldKind::PricePerUnit, "rate_label", rate_label),
    ]
}

fn currency_per_unit(text: &str, plausibility: &Plausibility) -> Option<Hit> {
    first_plausible(&PRICE_CURRENCY_PER_UNIT, text, plausibility, Confidence::High)
}

fn number_per_unit(text: &str, plausibility: &Plausibility) -> Option<Hit> {
    first_plausible(&PRICE_PER_UNIT_SUFFIX, text, plausibility, Confidence::Medium)
}

fn rate_label(text: &str, plausibility: &Plausibility) -> Option<Hit> {
    first_plausible(&PRICE_LABELED, text, plausibility, Confidence::Medium)
}

fn first_plausible(
    pattern: &Regex,
    text: &str,
    plausibility: &Plausibility,
    confidence: Confidence,
) -> Option<Hit> {
    pattern.captures_iter(text).find_map(|caps| {
        let value = parse_decimal(&caps[1])?;
        if !plausibility.accepts_unit_price(value) {
            return None;
        }
        let raw = caps.get(0).map(|m| m.as_str()).unwrap_or(&caps[1]);
        Some(Hit::new(raw.trim(), FieldValue::Number(value), confidence))
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn price_of(text: &str) -> Option<(Decimal, Confidence)> {
        let p = Plausibility::default();
        matchers()
            .iter()
            .find_map(|m| m.apply(text, &p))
            .map(|c| (c.value.as_number().unwrap(), c.confidence))
    }

    #[test]
    fn test_currency_with_qualifier() {
        assert_eq!(
            price_of("RATE $1.42/L"),
            Some((Decimal::from_str("1.42").unwrap(), Confidence::High))
        );
        assert_eq!(
            price_of("Rs. 95.50 per ltr"),
            Some((Decimal::from_str("95.50").unwrap(), Confidence::High))
        );
    }

    #[test]
    fn test_qualifier_without_currency() {
        assert_eq!(
            price_of("1.42/L"),
            Some((Decimal::from_str("1.42").unwrap(), Confidence::Medium))
        );
        assert_eq!(
            price_of("RATE: 104.21"),
            Some((Decimal::from_str("104.21").unwrap(), Confidence::Medium))
        );
    }

    #[test]
    fn test_bare_currency_amount_is_not_unit_price() {
        assert_eq!(price_of("TOTAL $14.91"), None);
        assert_eq!(price_of("$14.91"), None);
        assert_eq!(price_of("AMOUNT: Rs 500.00"), None);
    }
}
