//! Error types for vidscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidscribeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid chunk plan: overlap of {overlap_bytes} bytes must be smaller than chunk size of {chunk_bytes} bytes")]
    InvalidChunkPlan { chunk_bytes: u64, overlap_bytes: u64 },

    #[error("Recognition service API key is not configured (set OPENAI_API_KEY or asr.api_key)")]
    MissingApiKey,

    // Request errors
    #[error("Missing url")]
    MissingUrl,

    #[error("Video exceeds {} limit ({seconds}s)", limit_label(*limit_secs))]
    DurationExceeded { seconds: u64, limit_secs: u64 },

    // Source acquisition errors
    #[error("Tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Media inspection failed: {message}")]
    MediaInfo { message: String },

    #[error("Audio download failed: {message}")]
    Download { message: String },

    #[error("Caption fetch failed: {message}")]
    Captions { message: String },

    // Recognition errors
    #[error("Recognition failed on chunk {chunk}: {message}")]
    Recognition { chunk: usize, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl VidscribeError {
    /// True for errors caused by the request itself rather than by a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            VidscribeError::MissingUrl | VidscribeError::DurationExceeded { .. }
        )
    }
}

/// "3-hour", "90-minute" or "45-second", whichever unit divides the limit.
fn limit_label(secs: u64) -> String {
    if secs > 0 && secs % 3600 == 0 {
        format!("{}-hour", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}-minute", secs / 60)
    } else {
        format!("{secs}-second")
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VidscribeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = VidscribeError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = VidscribeError::ConfigInvalidValue {
            key: "chunking.floor_bytes_per_sec".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for chunking.floor_bytes_per_sec: must be positive"
        );
    }

    #[test]
    fn test_invalid_chunk_plan_display() {
        let error = VidscribeError::InvalidChunkPlan {
            chunk_bytes: 100,
            overlap_bytes: 100,
        };
        assert_eq!(
            error.to_string(),
            "Invalid chunk plan: overlap of 100 bytes must be smaller than chunk size of 100 bytes"
        );
    }

    #[test]
    fn test_duration_exceeded_display() {
        let error = VidscribeError::DurationExceeded {
            seconds: 12_000,
            limit_secs: 10_800,
        };
        assert_eq!(error.to_string(), "Video exceeds 3-hour limit (12000s)");
    }

    #[test]
    fn test_duration_exceeded_partial_hour_limits() {
        let error = VidscribeError::DurationExceeded {
            seconds: 6_000,
            limit_secs: 5_400,
        };
        assert_eq!(error.to_string(), "Video exceeds 90-minute limit (6000s)");

        let error = VidscribeError::DurationExceeded {
            seconds: 100,
            limit_secs: 45,
        };
        assert_eq!(error.to_string(), "Video exceeds 45-second limit (100s)");
    }

    #[test]
    fn test_recognition_display() {
        let error = VidscribeError::Recognition {
            chunk: 1,
            message: "429 Too Many Requests".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition failed on chunk 1: 429 Too Many Requests"
        );
    }

    #[test]
    fn test_missing_url_display() {
        assert_eq!(VidscribeError::MissingUrl.to_string(), "Missing url");
    }

    #[test]
    fn test_client_errors() {
        assert!(VidscribeError::MissingUrl.is_client_error());
        assert!(
            VidscribeError::DurationExceeded {
                seconds: 1,
                limit_secs: 10_800
            }
            .is_client_error()
        );
        assert!(
            !VidscribeError::Download {
                message: "boom".to_string()
            }
            .is_client_error()
        );
        assert!(
            !VidscribeError::Recognition {
                chunk: 0,
                message: "boom".to_string()
            }
            .is_client_error()
        );
    }

    #[test]
    fn test_other_display() {
        let error = VidscribeError::Other("unexpected error".to_string());
        assert_eq!(error.to_string(), "unexpected error");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: VidscribeError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: VidscribeError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: VidscribeError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<VidscribeError>();
        assert_sync::<VidscribeError>();
    }
}
