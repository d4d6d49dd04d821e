//! Adapter between the pipeline and a vision backend.

use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::AdapterError;
use crate::models::config::ExtractionConfig;
use crate::receipt::rules::Plausibility;

use super::response::parse_fields;
use super::{PartialFieldSet, VisionExtractor};

/// Requests fields from a [`VisionExtractor`] and validates the answer.
#[derive(Clone)]
pub struct AiExtractionAdapter {
    backend: Arc<dyn VisionExtractor>,
    plausibility: Plausibility,
    send_observed_text: bool,
}

impl AiExtractionAdapter {
    /// Adapter validating against default ranges anchored at today.
    pub fn new(backend: Arc<dyn VisionExtractor>) -> Self {
        Self {
            backend,
            plausibility: Plausibility::from_config(&ExtractionConfig::default()),
            send_observed_text: true,
        }
    }

    /// Use explicit range checks for response validation.
    pub fn with_plausibility(mut self, plausibility: Plausibility) -> Self {
        self.plausibility = plausibility;
        self
    }

    /// Whether heuristically observed text is forwarded to the backend.
    pub fn with_observed_text(mut self, enabled: bool) -> Self {
        self.send_observed_text = enabled;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Request and validate fields, reporting what went wrong.
    pub async fn try_extract(
        &self,
        image: &DynamicImage,
        observed_text: Option<&str>,
    ) -> Result<PartialFieldSet, AdapterError> {
        let observed_text = observed_text
            .filter(|t| self.send_observed_text && !t.trim().is_empty());

        debug!(
            "Requesting fields from {} ({} observed text)",
            self.backend.name(),
            if observed_text.is_some() { "with" } else { "without" }
        );

        let content = self.backend.request_fields(image, observed_text).await?;
        parse_fields(&content, &self.plausibility)
    }

    /// Request fields; any failure yields an empty set.
    pub async fn extract(&self, image: &DynamicImage, observed_text: Option<&str>) -> PartialFieldSet {
        match self.try_extract(image, observed_text).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!("AI extraction via {} failed: {}", self.backend.name(), e);
                PartialFieldSet::empty()
            }
        }
    }
}

impl std::fmt::Debug for AiExtractionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiExtractionAdapter")
            .field("backend", &self.backend.name())
            .field("plausibility", &self.plausibility)
            .field("send_observed_text", &self.send_observed_text)
            .finish()
    }
}
