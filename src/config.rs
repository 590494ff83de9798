use crate::defaults;
use crate::error::{Result, VidscribeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub asr: AsrConfig,
    pub chunking: ChunkingConfig,
    pub pacing: PacingConfig,
    pub source: SourceConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Recognition service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AsrConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

/// Chunk planning and stitching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub target_chunk_secs: u64,
    pub overlap_secs: u64,
    pub floor_bytes_per_sec: u64,
    pub dedup_window: usize,
}

/// Pacing between recognition calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PacingConfig {
    pub mode: PacingMode,
    /// Fixed mode: delay between calls. Token bucket: refill interval.
    pub delay_ms: u64,
    /// Token bucket capacity (ignored in fixed mode).
    pub burst: u32,
}

/// Pacing strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    Fixed,
    TokenBucket,
}

/// Media source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub ytdlp_binary: String,
    pub format: String,
    pub max_duration_secs: u64,
    pub caption_language: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
        }
    }
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::ASR_BASE_URL.to_string(),
            model: defaults::ASR_MODEL.to_string(),
            temperature: 0.0,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_chunk_secs: defaults::TARGET_CHUNK_SECS,
            overlap_secs: defaults::OVERLAP_SECS,
            floor_bytes_per_sec: defaults::FLOOR_BYTES_PER_SEC,
            dedup_window: defaults::DEDUP_WINDOW_TOKENS,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            mode: PacingMode::Fixed,
            delay_ms: defaults::PACING_DELAY_MS,
            burst: 1,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            ytdlp_binary: defaults::YTDLP_BINARY.to_string(),
            format: defaults::AUDIO_FORMAT.to_string(),
            max_duration_secs: defaults::MAX_DURATION_SECS,
            caption_language: defaults::CAPTION_LANGUAGE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VidscribeError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VidscribeError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(VidscribeError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - OPENAI_API_KEY → asr.api_key
    /// - OPENAI_BASE_URL → asr.base_url
    /// - VIDSCRIBE_MODEL → asr.model
    /// - VIDSCRIBE_YTDLP → source.ytdlp_binary
    /// - PORT → server.port (ignored when not a valid port)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            self.asr.api_key = Some(key);
        }

        if let Ok(url) = std::env::var("OPENAI_BASE_URL")
            && !url.is_empty()
        {
            self.asr.base_url = url;
        }

        if let Ok(model) = std::env::var("VIDSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.asr.model = model;
        }

        if let Ok(binary) = std::env::var("VIDSCRIBE_YTDLP")
            && !binary.is_empty()
        {
            self.source.ytdlp_binary = binary;
        }

        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.trim().parse::<u16>()
        {
            self.server.port = port;
        }

        self
    }

    /// Check values that would make the pipeline unusable.
    pub fn validate(&self) -> Result<()> {
        let chunking = &self.chunking;
        if chunking.target_chunk_secs == 0 {
            return Err(invalid("chunking.target_chunk_secs", "must be positive"));
        }
        if chunking.overlap_secs >= chunking.target_chunk_secs {
            return Err(invalid(
                "chunking.overlap_secs",
                "must be smaller than chunking.target_chunk_secs",
            ));
        }
        if chunking.floor_bytes_per_sec == 0 {
            return Err(invalid("chunking.floor_bytes_per_sec", "must be positive"));
        }
        if chunking.dedup_window == 0 {
            return Err(invalid("chunking.dedup_window", "must be positive"));
        }
        if self.pacing.mode == PacingMode::TokenBucket && self.pacing.burst == 0 {
            return Err(invalid("pacing.burst", "must be positive"));
        }
        if self.source.max_duration_secs == 0 {
            return Err(invalid("source.max_duration_secs", "must be positive"));
        }
        Ok(())
    }

    /// Look up a value by dotted path (e.g. `chunking.overlap_secs`).
    pub fn get_value_by_path(&self, key: &str) -> Result<String> {
        let root = toml::Value::try_from(self)
            .map_err(|e| VidscribeError::Other(format!("Failed to serialize config: {e}")))?;

        let mut current = &root;
        for part in key.split('.') {
            current = current.get(part).ok_or_else(|| VidscribeError::ConfigInvalidValue {
                key: key.to_string(),
                message: "unknown key".to_string(),
            })?;
        }

        Ok(match current {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Render the configuration as TOML with the API key masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.asr.api_key.is_some() {
            shown.asr.api_key = Some("***".to_string());
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| VidscribeError::Other(format!("Failed to serialize config: {e}")))
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/vidscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("vidscribe")
            .join("config.toml")
    }
}

fn invalid(key: &str, message: &str) -> VidscribeError {
    VidscribeError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
