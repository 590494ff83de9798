//! OpenAI-compatible `/audio/transcriptions` recognizer.
//!
//! Uploads each chunk as a multipart form and asks for a plain-text
//! response. All configuration arrives through `AsrConfig`; nothing is read
//! from process-wide state here.

use crate::config::AsrConfig;
use crate::error::{Result, VidscribeError};
use crate::stt::recognizer::{AudioChunk, Recognizer};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::debug;

pub struct OpenAiRecognizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiRecognizer {
    /// Creates a recognizer from configuration.
    ///
    /// Fails with `MissingApiKey` when no key is configured.
    pub fn new(config: &AsrConfig) -> Result<Self> {
        Self::with_client(Client::new(), config)
    }

    /// Creates a recognizer that reuses an existing HTTP client.
    pub fn with_client(client: Client, config: &AsrConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(VidscribeError::MissingApiKey)?
            .to_string();

        Ok(Self {
            client,
            api_key,
            base_url: normalize_base_url(&config.base_url),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Full URL of the transcription endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    /// Text fields of the multipart form, in the order they are sent.
    fn form_fields(&self, chunk: &AudioChunk<'_>) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("model", self.model.clone()),
            ("response_format", "text".to_string()),
            ("temperature", self.temperature.to_string()),
        ];
        if let Some(language) = chunk.language {
            fields.push(("language", language.to_string()));
        }
        fields
    }
}

/// Strips trailing slashes and a trailing `/models` from a base URL.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    url.strip_suffix("/models").unwrap_or(url).to_string()
}

#[async_trait]
impl Recognizer for OpenAiRecognizer {
    async fn recognize(&self, chunk: AudioChunk<'_>) -> Result<String> {
        let failed = |message: String| VidscribeError::Recognition {
            chunk: chunk.index,
            message,
        };

        let part = Part::bytes(chunk.bytes.to_vec())
            .file_name(chunk.file_name())
            .mime_str(chunk.media_type)
            .map_err(|e| failed(format!("Invalid media type {}: {e}", chunk.media_type)))?;

        let mut form = Form::new().part("file", part);
        for (name, value) in self.form_fields(&chunk) {
            form = form.text(name, value);
        }

        debug!(
            chunk = chunk.index,
            bytes = chunk.bytes.len(),
            language = chunk.language.unwrap_or("auto"),
            "Sending chunk to recognition service"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| failed(format!("Failed to send request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failed(format!("API returned {status}: {}", body.trim())));
        }

        response
            .text()
            .await
            .map_err(|e| failed(format!("Failed to read response: {e}")))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: Option<&str>) -> AsrConfig {
        AsrConfig {
            api_key: key.map(str::to_string),
            ..AsrConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        assert!(matches!(
            OpenAiRecognizer::new(&config_with_key(None)),
            Err(VidscribeError::MissingApiKey)
        ));
        assert!(matches!(
            OpenAiRecognizer::new(&config_with_key(Some("   "))),
            Err(VidscribeError::MissingApiKey)
        ));
    }

    #[test]
    fn test_endpoint_uses_default_base_url() {
        let recognizer = OpenAiRecognizer::new(&config_with_key(Some("sk-test"))).unwrap();
        assert_eq!(
            recognizer.endpoint(),
            "https://api.openai.com/v1/audio/transcriptions"
        );
        assert_eq!(recognizer.model_name(), "whisper-1");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://example.com/v1/"),
            "https://example.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://example.com/v1/models"),
            "https://example.com/v1"
        );
        assert_eq!(
            normalize_base_url(" https://example.com/v1 "),
            "https://example.com/v1"
        );
    }

    #[test]
    fn test_form_fields_without_language() {
        let recognizer = OpenAiRecognizer::new(&config_with_key(Some("sk-test"))).unwrap();
        let chunk = AudioChunk {
            index: 0,
            bytes: b"",
            media_type: "audio/webm",
            extension: "webm",
            language: None,
        };
        let fields = recognizer.form_fields(&chunk);
        assert_eq!(
            fields,
            vec![
                ("model", "whisper-1".to_string()),
                ("response_format", "text".to_string()),
                ("temperature", "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_form_fields_with_forced_language() {
        let recognizer = OpenAiRecognizer::new(&config_with_key(Some("sk-test"))).unwrap();
        let chunk = AudioChunk {
            index: 2,
            bytes: b"",
            media_type: "audio/webm",
            extension: "webm",
            language: Some("ru"),
        };
        let fields = recognizer.form_fields(&chunk);
        assert_eq!(fields.last(), Some(&("language", "ru".to_string())));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_recognition_error() {
        let config = AsrConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            ..AsrConfig::default()
        };
        let recognizer = OpenAiRecognizer::new(&config).unwrap();
        let chunk = AudioChunk {
            index: 4,
            bytes: b"not really audio",
            media_type: "audio/webm",
            extension: "webm",
            language: None,
        };
        match recognizer.recognize(chunk).await {
            Err(VidscribeError::Recognition { chunk, .. }) => assert_eq!(chunk, 4),
            other => panic!("Expected Recognition error, got {:?}", other),
        }
    }
}
