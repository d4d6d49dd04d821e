//! OpenAI-compatible chat completions backend.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::AdapterError;
use crate::models::config::AiConfig;

use super::VisionExtractor;

const EXTRACTION_PROMPT: &str = r#"Extract fuel receipt data from this image. Return ONLY a valid JSON object with these fields:
{
  "date": "YYYY-MM-DD" or null,
  "quantity": number (fuel volume) or null,
  "pricePerUnit": number (price per unit of volume) or null,
  "stationName": string or null,
  "fuelGrade": string as printed on the receipt or null
}
Use null for anything you cannot read. Return ONLY the JSON object. No markdown, no explanation, no code fences."#;

/// Vision extraction through a chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiVisionExtractor {
    http: reqwest::Client,
    config: AiConfig,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiVisionExtractor {
    /// Create a client, reading the API key from the configured
    /// environment variable.
    pub fn from_config(config: &AiConfig) -> Result<Self, AdapterError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AdapterError::NotConfigured)?;
        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(config: &AiConfig, api_key: impl Into<String>) -> Result<Self, AdapterError> {
        if config.endpoint.trim().is_empty() {
            return Err(AdapterError::NotConfigured);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdapterError::Failure(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config: config.clone(),
            api_key: api_key.into(),
        })
    }

    fn request_body(&self, image_url: &str, observed_text: Option<&str>) -> Value {
        let mut prompt = EXTRACTION_PROMPT.to_string();
        if let Some(text) = observed_text {
            prompt.push_str("\n\nText already recognized on the receipt (may contain errors):\n");
            prompt.push_str(text);
        }

        json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image_url, "detail": "high" } }
                ]
            }],
            "max_tokens": self.config.max_tokens,
            "temperature": 0
        })
    }
}

/// Downscale to fit `max_dimension` and encode as a JPEG data URL.
pub(crate) fn encode_image(
    image: &DynamicImage,
    max_dimension: u32,
    quality: u8,
) -> Result<String, AdapterError> {
    let resized = if image.width().max(image.height()) > max_dimension {
        image.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        image.clone()
    };

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&resized.to_rgb8())
        .map_err(|e| AdapterError::Failure(format!("failed to encode image: {}", e)))?;

    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&bytes)))
}

/// Pull the message text out of a chat completions envelope.
pub(crate) fn message_content(body: &str) -> Result<String, AdapterError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AdapterError::MalformedResponse(format!("unexpected envelope: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AdapterError::MalformedResponse("response has no message content".to_string()))
}

#[async_trait]
impl VisionExtractor for OpenAiVisionExtractor {
    async fn request_fields(
        &self,
        image: &DynamicImage,
        observed_text: Option<&str>,
    ) -> Result<String, AdapterError> {
        let image_url = encode_image(image, self.config.max_image_dimension, self.config.jpeg_quality)?;
        let body = self.request_body(&image_url, observed_text);

        debug!(
            "POST {} (model {}, {} byte image)",
            self.config.endpoint,
            self.config.model,
            image_url.len()
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdapterError::Timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    AdapterError::Failure(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("AI service returned {}: {}", status, message);
            return Err(AdapterError::Failure(format!("HTTP {}", status)));
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AdapterError::Timeout(Duration::from_secs(self.config.timeout_secs))
            } else {
                AdapterError::Failure(e.to_string())
            }
        })?;

        message_content(&text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_not_configured() {
        let config = AiConfig {
            api_key_env: "FUELSCAN_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert_eq!(
            OpenAiVisionExtractor::from_config(&config).unwrap_err(),
            AdapterError::NotConfigured
        );
    }

    #[test]
    fn test_encode_image_downscales() {
        let image = DynamicImage::new_rgb8(400, 100);
        let url = encode_image(&image, 64, 80).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let bytes = BASE64
            .decode(url.trim_start_matches("data:image/jpeg;base64,"))
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 16);
    }

    #[test]
    fn test_request_body() {
        let client = OpenAiVisionExtractor::with_api_key(&AiConfig::default(), "sk-test").unwrap();
        let body = client.request_body("data:image/jpeg;base64,AAAA", Some("QTY 10.5 L"));

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 0);
        assert_eq!(body["max_tokens"], 300);
        let prompt = body["messages"][0]["content"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("pricePerUnit"));
        assert!(prompt.ends_with("QTY 10.5 L"));
        assert_eq!(
            body["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn test_message_content() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"quantity\": 8.0}"}}]}"#;
        assert_eq!(message_content(body).unwrap(), r#"{"quantity": 8.0}"#);

        assert!(matches!(
            message_content(r#"{"choices":[]}"#),
            Err(AdapterError::MalformedResponse(_))
        ));
        assert!(matches!(
            message_content("<html>bad gateway</html>"),
            Err(AdapterError::MalformedResponse(_))
        ));
    }
}
