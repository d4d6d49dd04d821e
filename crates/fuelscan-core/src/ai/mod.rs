//! AI vision fallback.
//!
//! A [`VisionExtractor`] is the black-box backend: it receives the image
//! (plus any text the heuristic pass already saw) and answers with raw
//! model text. [`AiExtractionAdapter`] owns a backend and turns that text
//! into a validated [`PartialFieldSet`].

mod adapter;
mod openai;
mod response;
mod stub;

pub use adapter::AiExtractionAdapter;
pub use openai::OpenAiVisionExtractor;
pub use response::parse_fields;
pub use stub::StubVisionExtractor;

use async_trait::async_trait;
use chrono::NaiveDate;
use image::DynamicImage;
use rust_decimal::Decimal;

use crate::error::AdapterError;
use crate::models::receipt::{CandidateField, FieldKind, FieldValue};
use crate::receipt::CandidateSet;

/// A network-backed (or simulated) vision extraction capability.
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    /// Ask the backend for the receipt fields. Returns the model's raw text.
    async fn request_fields(
        &self,
        image: &DynamicImage,
        observed_text: Option<&str>,
    ) -> Result<String, AdapterError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Fields recovered from an AI response, each independently present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFieldSet {
    pub date: Option<NaiveDate>,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<Decimal>,
    pub station_name: Option<String>,
    pub fuel_grade_text: Option<String>,
}

impl PartialFieldSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        [
            self.date.is_some(),
            self.quantity.is_some(),
            self.price_per_unit.is_some(),
            self.station_name.is_some(),
            self.fuel_grade_text.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into AI-sourced candidates (always Medium confidence).
    pub fn into_candidates(self) -> CandidateSet {
        let mut set = CandidateSet::new();

        if let Some(date) = self.date {
            set.insert(CandidateField::ai(
                FieldKind::ScanDate,
                date.to_string(),
                FieldValue::Date(date),
            ));
        }
        if let Some(quantity) = self.quantity {
            set.insert(CandidateField::ai(
                FieldKind::Quantity,
                quantity.to_string(),
                FieldValue::Number(quantity),
            ));
        }
        if let Some(price) = self.price_per_unit {
            set.insert(CandidateField::ai(
                FieldKind::PricePerUnit,
                price.to_string(),
                FieldValue::Number(price),
            ));
        }
        if let Some(station) = self.station_name {
            set.insert(CandidateField::ai(
                FieldKind::StationName,
                station.clone(),
                FieldValue::Text(station),
            ));
        }
        if let Some(grade) = self.fuel_grade_text {
            set.insert(CandidateField::ai(
                FieldKind::FuelGradeText,
                grade.clone(),
                FieldValue::Text(grade),
            ));
        }

        set
    }
}
