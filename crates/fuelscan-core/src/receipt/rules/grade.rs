//! Fuel grade text extraction.
//!
//! Matchers return the fragment text verbatim; classification into a
//! closed category happens after merging.

use regex::Regex;

use crate::models::receipt::{Confidence, FieldKind, FieldValue};

use super::patterns::{GRADE_DIESEL, GRADE_GENERIC, GRADE_PREMIUM};
use super::{FieldMatcher, Hit, Plausibility};

/// Grade matchers, most specific keywords first.
pub fn matchers() -> Vec<FieldMatcher> {
    vec![
        FieldMatcher::new(FieldKind::FuelGradeText, "premium_keyword", premium_keyword),
        FieldMatcher::new(FieldKind::FuelGradeText, "diesel_keyword", diesel_keyword),
        FieldMatcher::new(FieldKind::FuelGradeText, "generic_keyword", generic_keyword),
    ]
}

fn premium_keyword(text: &str, _plausibility: &Plausibility) -> Option<Hit> {
    keyword_hit(&GRADE_PREMIUM, text, Confidence::Medium)
}

fn diesel_keyword(text: &str, _plausibility: &Plausibility) -> Option<Hit> {
    keyword_hit(&GRADE_DIESEL, text, Confidence::Medium)
}

fn generic_keyword(text: &str, _plausibility: &Plausibility) -> Option<Hit> {
    keyword_hit(&GRADE_GENERIC, text, Confidence::Low)
}

fn keyword_hit(pattern: &Regex, text: &str, confidence: Confidence) -> Option<Hit> {
    if !pattern.is_match(text) {
        return None;
    }
    let verbatim = text.trim();
    Some(Hit::new(
        verbatim,
        FieldValue::Text(verbatim.to_string()),
        confidence,
    ))
}
