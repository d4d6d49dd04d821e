//! Error types for the fuelscan-core library.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the fuelscan library.
#[derive(Error, Debug)]
pub enum FuelscanError {
    /// Text recognition error.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// AI extraction error.
    #[error("AI extraction error: {0}")]
    Adapter(#[from] AdapterError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a text observation source.
///
/// The two variants are kept apart because the caller reacts differently:
/// an unavailable engine will not recover on retry, a failed pass might.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// The recognition capability cannot be reached (models missing, engine not built).
    #[error("text recognition unavailable: {0}")]
    Unavailable(String),

    /// The engine ran and reported an error for this image.
    #[error("text recognition failed: {0}")]
    Failed(String),
}

/// Errors raised by the AI extraction path.
///
/// These never reach the caller of a scan; the orchestrator absorbs them
/// and falls back to heuristic-only results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The call exceeded its time ceiling.
    #[error("AI extraction timed out after {0:?}")]
    Timeout(Duration),

    /// Transport or service error.
    #[error("AI extraction failed: {0}")]
    Failure(String),

    /// The service answered, but nothing usable could be parsed.
    #[error("malformed AI response: {0}")]
    MalformedResponse(String),

    /// No credentials or endpoint configured.
    #[error("AI extraction is not configured")]
    NotConfigured,
}

/// Result type for the fuelscan library.
pub type Result<T> = std::result::Result<T, FuelscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecognitionError::Unavailable("no models".to_string());
        assert_eq!(err.to_string(), "text recognition unavailable: no models");

        let err = AdapterError::Timeout(Duration::from_secs(8));
        assert_eq!(err.to_string(), "AI extraction timed out after 8s");
    }

    #[test]
    fn test_error_conversion() {
        let err: FuelscanError = AdapterError::NotConfigured.into();
        assert!(matches!(err, FuelscanError::Adapter(AdapterError::NotConfigured)));
        assert!(err.to_string().starts_with("AI extraction error"));
    }
}
