//! vidscribe - transcripts for online videos
//!
//! Uses published captions when a source has them and falls back to chunked
//! speech recognition over the downloaded audio when it does not.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod fallback;
#[cfg(feature = "cli")]
pub mod logging;
#[cfg(feature = "server")]
pub mod server;
pub mod service;
pub mod source;
pub mod stt;
pub mod types;

// Core traits (source → recognize → stitch)
pub use fallback::pacing::Pacer;
pub use source::captions::CaptionFetcher;
pub use source::command::{CommandRunner, SystemCommandRunner};
pub use source::media::{AudioDownloader, MediaInspector};
pub use stt::recognizer::Recognizer;

// Pipeline
pub use fallback::pipeline::{FallbackPipeline, FallbackRequest};
pub use service::{SourceMode, TranscriptionService};
pub use types::{TranscribeOptions, TranscriptSource, TranscriptionOutcome};

// Error handling
pub use error::{Result, VidscribeError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
