//! Configuration structures for the scanning pipeline.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration for the fuelscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// On-device OCR configuration.
    pub ocr: OcrConfig,

    /// Heuristic extraction and merge configuration.
    pub extraction: ExtractionConfig,

    /// AI fallback configuration.
    pub ai: AiConfig,
}

/// On-device OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` glyph markers in recognized text.
    pub keep_unknown_glyphs: bool,

    /// Vertical distance (pixels) within which boxes are treated as one row.
    pub row_tolerance: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unknown_glyphs: false,
            row_tolerance: 20.0,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.model_dir.join(file_name)
    }
}

/// Heuristic extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Escalate to AI when fewer than this many fields were found.
    pub min_heuristic_fields: usize,

    /// Reject dates older than this many days before the scan.
    pub max_receipt_age_days: i64,

    /// Upper bound for a plausible fuel quantity.
    pub max_quantity: u32,

    /// Upper bound for a plausible unit price.
    pub max_unit_price: u32,

    /// Let a Medium-confidence AI candidate replace a Low-confidence
    /// heuristic one. Off by default, which keeps heuristics authoritative.
    pub prefer_ai_over_weak_heuristics: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_heuristic_fields: 3,
            max_receipt_age_days: 730,
            max_quantity: 1000,
            max_unit_price: 10_000,
            prefer_ai_over_weak_heuristics: false,
        }
    }
}

/// AI vision fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Allow escalation to the AI service.
    pub enabled: bool,

    /// Chat completions endpoint.
    pub endpoint: String,

    /// Vision model name.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Hard ceiling on one AI call, in seconds.
    pub timeout_secs: u64,

    /// Longer image side sent to the service, in pixels.
    pub max_image_dimension: u32,

    /// JPEG quality for the uploaded image (1-100).
    pub jpeg_quality: u8,

    /// Token budget for the response.
    pub max_tokens: u32,

    /// Include heuristically observed text in the prompt.
    pub send_observed_text: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 8,
            max_image_dimension: 1024,
            jpeg_quality: 80,
            max_tokens: 300,
            send_observed_text: true,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Ceiling applied to the AI call.
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.extraction.min_heuristic_fields, 3);
        assert!(!config.extraction.prefer_ai_over_weak_heuristics);
        assert_eq!(config.ai_timeout(), Duration::from_secs(8));
        assert_eq!(
            config.ocr.model_path("det.onnx"),
            PathBuf::from("models").join("det.onnx")
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "ai": { "timeout_secs": 5 }, "extraction": { "min_heuristic_fields": 4 } }"#;
        let config: ScanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.ai.timeout_secs, 5);
        assert_eq!(config.ai.model, "gpt-4o");
        assert_eq!(config.extraction.min_heuristic_fields, 4);
        assert_eq!(config.extraction.max_receipt_age_days, 730);
    }
}
