//! Deterministic vision backend for tests and dry runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::AdapterError;

use super::VisionExtractor;

/// Backend that answers with a fixed payload or error, optionally after a
/// delay, and counts how often it was called.
#[derive(Debug)]
pub struct StubVisionExtractor {
    response: Result<String, AdapterError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_observed_text: Mutex<Option<String>>,
}

impl StubVisionExtractor {
    /// Always answer with `payload`.
    pub fn responding(payload: impl Into<String>) -> Self {
        Self::with_response(Ok(payload.into()))
    }

    /// Always fail with `error`.
    pub fn failing(error: AdapterError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<String, AdapterError>) -> Self {
        Self {
            response,
            delay: None,
            calls: AtomicUsize::new(0),
            last_observed_text: Mutex::new(None),
        }
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `request_fields` invocations so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Observed text passed on the most recent call.
    pub fn last_observed_text(&self) -> Option<String> {
        self.last_observed_text
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VisionExtractor for StubVisionExtractor {
    async fn request_fields(
        &self,
        _image: &DynamicImage,
        observed_text: Option<&str>,
    ) -> Result<String, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_observed_text.lock() {
            *last = observed_text.map(str::to_string);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.response.clone()
    }

    fn name(&self) -> &str {
        "stub"
    }
}
