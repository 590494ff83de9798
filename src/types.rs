//! Request and result types shared by the service, the HTTP server and the CLI.

use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    /// Published captions of the source.
    Captions,
    /// Chunked speech recognition over the audio.
    Asr,
}

impl fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptSource::Captions => write!(f, "captions"),
            TranscriptSource::Asr => write!(f, "asr"),
        }
    }
}

/// Final result of one transcription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionOutcome {
    pub transcript: String,
    pub language: String,
    /// Source length in seconds, as reported by the inspector.
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    pub source: TranscriptSource,
}

/// Caller options for a transcription request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscribeOptions {
    /// Requested language code, e.g. `en`.
    pub language: Option<String>,
    /// When explicitly `false`, `language` is forced on the recognizer.
    pub auto_language_detection: Option<bool>,
}

impl TranscribeOptions {
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_auto_language_detection(mut self, enabled: bool) -> Self {
        self.auto_language_detection = Some(enabled);
        self
    }

    /// Requested language, with blank values treated as absent.
    pub fn requested_language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Language forced on the recognizer.
    ///
    /// Only set when auto detection was explicitly turned off.
    pub fn forced_language(&self) -> Option<&str> {
        if self.auto_language_detection == Some(false) {
            self.requested_language()
        } else {
            None
        }
    }

    /// Language reported back to the caller.
    pub fn reported_language(&self) -> String {
        self.requested_language()
            .unwrap_or(defaults::AUTO_LANGUAGE)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_wire_names() {
        let outcome = TranscriptionOutcome {
            transcript: "hello".to_string(),
            language: "auto".to_string(),
            duration_seconds: 42,
            source: TranscriptSource::Asr,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "transcript": "hello",
                "language": "auto",
                "duration": 42,
                "source": "asr"
            })
        );
    }

    #[test]
    fn test_source_display_matches_serde() {
        for source in [TranscriptSource::Captions, TranscriptSource::Asr] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{source}\""));
        }
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: TranscribeOptions =
            serde_json::from_str(r#"{"language": "de", "autoLanguageDetection": false}"#).unwrap();
        assert_eq!(options.language.as_deref(), Some("de"));
        assert_eq!(options.auto_language_detection, Some(false));

        let empty: TranscribeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, TranscribeOptions::default());
    }

    #[test]
    fn test_forced_language_only_when_detection_disabled() {
        let base = TranscribeOptions::default().with_language("de");
        assert_eq!(base.forced_language(), None);
        assert_eq!(
            base.clone()
                .with_auto_language_detection(true)
                .forced_language(),
            None
        );
        assert_eq!(
            base.with_auto_language_detection(false).forced_language(),
            Some("de")
        );
    }

    #[test]
    fn test_forced_language_requires_language() {
        let options = TranscribeOptions::default().with_auto_language_detection(false);
        assert_eq!(options.forced_language(), None);
    }

    #[test]
    fn test_reported_language() {
        assert_eq!(TranscribeOptions::default().reported_language(), "auto");
        assert_eq!(
            TranscribeOptions::default()
                .with_language("fr")
                .reported_language(),
            "fr"
        );
        assert_eq!(
            TranscribeOptions::default()
                .with_language("  ")
                .reported_language(),
            "auto"
        );
    }
}
