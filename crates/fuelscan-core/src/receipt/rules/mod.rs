//! Rule-based field matchers for fuel receipts.
//!
//! Each field kind has an ordered list of [`FieldMatcher`]s. The parser
//! tries them in priority order; the first one that hits on any fragment
//! decides the field.

pub mod dates;
pub mod grade;
pub mod numbers;
pub mod patterns;
pub mod price;
pub mod quantity;
pub mod station;

pub use dates::{parse_date, DateExtractor};
pub use numbers::{parse_decimal, round_currency, round_volume};

use chrono::{Local, NaiveDate, TimeDelta};
use rust_decimal::Decimal;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::{CandidateField, Confidence, FieldKind, FieldValue};

/// A value found in one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Matched text.
    pub raw: String,
    /// Parsed value.
    pub value: FieldValue,
    /// Confidence assigned by the matcher.
    pub confidence: Confidence,
}

impl Hit {
    pub fn new(raw: impl Into<String>, value: FieldValue, confidence: Confidence) -> Self {
        Self {
            raw: raw.into(),
            value,
            confidence,
        }
    }
}

/// Signature shared by all matcher functions.
pub type MatchFn = fn(&str, &Plausibility) -> Option<Hit>;

/// A named matcher for one field kind.
#[derive(Clone, Copy)]
pub struct FieldMatcher {
    kind: FieldKind,
    name: &'static str,
    find: MatchFn,
}

impl FieldMatcher {
    pub const fn new(kind: FieldKind, name: &'static str, find: MatchFn) -> Self {
        Self { kind, name, find }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Try this matcher on one fragment's text.
    pub fn apply(&self, text: &str, plausibility: &Plausibility) -> Option<CandidateField> {
        (self.find)(text, plausibility)
            .map(|hit| CandidateField::heuristic(self.kind, hit.raw, hit.value, hit.confidence))
    }
}

impl std::fmt::Debug for FieldMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMatcher")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

/// Matchers for a field kind, highest priority first.
pub fn matchers_for(kind: FieldKind) -> Vec<FieldMatcher> {
    match kind {
        FieldKind::ScanDate => dates::matchers(),
        FieldKind::Quantity => quantity::matchers(),
        FieldKind::PricePerUnit => price::matchers(),
        FieldKind::StationName => station::matchers(),
        FieldKind::FuelGradeText => grade::matchers(),
    }
}

/// Range checks shared by heuristic matchers and AI response validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plausibility {
    /// Date the scan happens; receipts cannot be from after it.
    pub reference_date: NaiveDate,
    /// Oldest accepted receipt, in days before `reference_date`.
    pub max_age_days: i64,
    /// Largest accepted fuel volume.
    pub max_quantity: Decimal,
    /// Largest accepted unit price.
    pub max_unit_price: Decimal,
}

impl Plausibility {
    /// Checks anchored at today's local date.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::with_reference_date(config, Local::now().date_naive())
    }

    /// Checks anchored at a fixed date.
    pub fn with_reference_date(config: &ExtractionConfig, reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            max_age_days: config.max_receipt_age_days,
            max_quantity: Decimal::from(config.max_quantity),
            max_unit_price: Decimal::from(config.max_unit_price),
        }
    }

    /// A date inside `[reference_date - max_age_days, reference_date]`.
    ///
    /// Negative ages accept only the reference date itself; ages past the
    /// calendar's range leave the window open below.
    pub fn accepts_date(&self, date: NaiveDate) -> bool {
        if date > self.reference_date {
            return false;
        }
        match self.oldest_accepted_date() {
            Some(oldest) => date >= oldest,
            None => true,
        }
    }

    fn oldest_accepted_date(&self) -> Option<NaiveDate> {
        TimeDelta::try_days(self.max_age_days.max(0))
            .and_then(|age| self.reference_date.checked_sub_signed(age))
    }

    pub fn accepts_quantity(&self, quantity: Decimal) -> bool {
        quantity > Decimal::ZERO && quantity <= self.max_quantity
    }

    pub fn accepts_unit_price(&self, price: Decimal) -> bool {
        price > Decimal::ZERO && price <= self.max_unit_price
    }
}

impl Default for Plausibility {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
