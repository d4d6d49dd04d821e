//! Fuel volume extraction.

use regex::Regex;

use crate::models::receipt::{Confidence, FieldKind, FieldValue};

use super::numbers::parse_decimal;
use super::patterns::{QUANTITY_LABELED, QUANTITY_WITH_UNIT};
use super::{FieldMatcher, Hit, Plausibility};

/// Quantity matchers, highest priority first.
pub fn matchers() -> Vec<FieldMatcher> {
    vec![
        FieldMatcher::new(FieldKind::Quantity, "number_with_unit", number_with_unit),
        FieldMatcher::new(FieldKind::Quantity, "labeled_number", labeled_number),
    ]
}

/// `10.5 L`, `25.00LTR`, `3.2 gal`: number and unit found together.
fn number_with_unit(text: &str, plausibility: &Plausibility) -> Option<Hit> {
    first_plausible(&QUANTITY_WITH_UNIT, text, plausibility, Confidence::High)
}

/// `QTY: 10.5`, `VOL 12`: inferred from a labeled number with no unit.
fn labeled_number(text: &str, plausibility: &Plausibility) -> Option<Hit> {
    first_plausible(&QUANTITY_LABELED, text, plausibility, Confidence::Medium)
}

fn first_plausible(
    pattern: &Regex,
    text: &str,
    plausibility: &Plausibility,
    confidence: Confidence,
) -> Option<Hit> {
    pattern.captures_iter(text).find_map(|caps| {
        let value = parse_decimal(&caps[1])?;
        if !plausibility.accepts_quantity(value) {
            return None;
        }
        let raw = caps.get(0).map(|m| m.as_str()).unwrap_or(&caps[1]);
        Some(Hit::new(raw.trim(), FieldValue::Number(value), confidence))
    })
}
