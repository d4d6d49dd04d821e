//! Receipt field data models.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The five fields tracked on a fuel receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    ScanDate,
    Quantity,
    PricePerUnit,
    StationName,
    FuelGradeText,
}

impl FieldKind {
    /// All field kinds in reporting order.
    pub const ALL: [FieldKind; 5] = [
        FieldKind::ScanDate,
        FieldKind::Quantity,
        FieldKind::PricePerUnit,
        FieldKind::StationName,
        FieldKind::FuelGradeText,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ScanDate => "date",
            Self::Quantity => "quantity",
            Self::PricePerUnit => "price per unit",
            Self::StationName => "station",
            Self::FuelGradeText => "fuel grade",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal confidence attached by the matcher that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Which extraction path produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Heuristic,
    Ai,
}

/// A typed candidate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Date(NaiveDate),
    Number(Decimal),
    Text(String),
}

impl FieldValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A single extracted value before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateField {
    /// Which of the five fields this is a candidate for.
    pub kind: FieldKind,
    /// Verbatim text the value was read from.
    pub raw_value: String,
    /// Parsed value.
    pub value: FieldValue,
    /// Matcher-assigned confidence.
    pub confidence: Confidence,
    /// Extraction path.
    pub source: CandidateSource,
}

impl CandidateField {
    /// Candidate produced by a heuristic matcher.
    pub fn heuristic(
        kind: FieldKind,
        raw_value: impl Into<String>,
        value: FieldValue,
        confidence: Confidence,
    ) -> Self {
        Self {
            kind,
            raw_value: raw_value.into(),
            value,
            confidence,
            source: CandidateSource::Heuristic,
        }
    }

    /// Candidate produced by the AI path. Confidence is always Medium,
    /// whatever the service claims about itself.
    pub fn ai(kind: FieldKind, raw_value: impl Into<String>, value: FieldValue) -> Self {
        Self {
            kind,
            raw_value: raw_value.into(),
            value,
            confidence: Confidence::Medium,
            source: CandidateSource::Ai,
        }
    }
}

/// Closed fuel grade category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelGrade {
    Regular,
    Premium,
    Diesel,
}

impl FuelGrade {
    /// Markers that classify a grade description as premium.
    const PREMIUM_MARKERS: [&'static str; 4] = ["PREMIUM", "XP95", "V-POWER", "VPOWER"];

    /// Markers that classify a grade description as diesel.
    const DIESEL_MARKERS: [&'static str; 2] = ["DIESEL", "HSD"];

    /// Classify free grade text. Premium is checked before diesel and
    /// anything unrecognized is regular.
    pub fn classify(text: &str) -> Self {
        let upper = text.to_uppercase();
        if Self::PREMIUM_MARKERS.iter().any(|m| upper.contains(m)) {
            Self::Premium
        } else if Self::DIESEL_MARKERS.iter().any(|m| upper.contains(m)) {
            Self::Diesel
        } else {
            Self::Regular
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Premium => "Premium",
            Self::Diesel => "Diesel",
        }
    }
}

impl fmt::Display for FuelGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Provenance reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMethod {
    Ocr,
    Ai,
    #[default]
    None,
}

impl fmt::Display for ScanMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ocr => "OCR",
            Self::Ai => "AI",
            Self::None => "none",
        })
    }
}

/// Final result of one scan.
///
/// Built once by the merger and read-only afterwards. Each field is
/// independently present or absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScannedReceiptResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_per_unit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    station_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fuel_grade: Option<FuelGrade>,
    method: ScanMethod,
}

impl ScannedReceiptResult {
    pub(crate) fn new(
        date: Option<NaiveDate>,
        quantity: Option<Decimal>,
        price_per_unit: Option<Decimal>,
        station_name: Option<String>,
        fuel_grade: Option<FuelGrade>,
        method: ScanMethod,
    ) -> Self {
        Self {
            date,
            quantity,
            price_per_unit,
            station_name,
            fuel_grade,
            method,
        }
    }

    /// The all-absent result.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }

    pub fn price_per_unit(&self) -> Option<Decimal> {
        self.price_per_unit
    }

    pub fn station_name(&self) -> Option<&str> {
        self.station_name.as_deref()
    }

    pub fn fuel_grade(&self) -> Option<FuelGrade> {
        self.fuel_grade
    }

    pub fn method(&self) -> ScanMethod {
        self.method
    }

    /// Number of fields present.
    pub fn field_count(&self) -> usize {
        [
            self.date.is_some(),
            self.quantity.is_some(),
            self.price_per_unit.is_some(),
            self.station_name.is_some(),
            self.fuel_grade.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Break the result into its parts; used by the form to take ownership.
    pub(crate) fn into_parts(
        self,
    ) -> (
        Option<NaiveDate>,
        Option<Decimal>,
        Option<Decimal>,
        Option<String>,
        Option<FuelGrade>,
    ) {
        (
            self.date,
            self.quantity,
            self.price_per_unit,
            self.station_name,
            self.fuel_grade,
        )
    }
}
