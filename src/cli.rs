//! Command-line interface for vidscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Transcripts for online videos: published captions first, speech recognition otherwise
#[derive(Parser, Debug)]
#[command(
    name = "vidscribe",
    version,
    about = "Transcripts for online videos: captions first, speech recognition otherwise"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress log output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: progress, -vv: per-chunk diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a pacing delay.
///
/// Supports any duration format accepted by `humantime` (`800ms`, `1s`,
/// `1s500ms`); bare numbers are milliseconds.
fn parse_pace(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a video or audio URL and print the transcript
    Transcribe {
        /// Source URL (YouTube watch/short link, or any URL yt-dlp understands)
        url: String,

        /// Language code (e.g., en, de). Also the preferred caption language
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Force --language on speech recognition instead of auto-detecting
        #[arg(long, requires = "language")]
        no_auto_language: bool,

        /// Treat the URL as a plain audio file (HTTP download, no captions)
        #[arg(long)]
        direct: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Delay between recognition calls (default: from config). Examples: 800ms, 2s
        #[arg(long, value_name = "DURATION", value_parser = parse_pace)]
        pace: Option<Duration>,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address (default: from config)
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Listen port (default: from config, or $PORT)
        #[arg(long, short = 'p', value_name = "PORT")]
        port: Option<u16>,
    },

    /// Show how a stream of the given size would be chunked
    Plan {
        /// Stream length in bytes
        #[arg(long, value_name = "BYTES")]
        length: u64,

        /// Declared bitrate in bits per second (default: unknown, floor applies)
        #[arg(long, value_name = "BPS")]
        bitrate: Option<u64>,
    },

    /// Manage configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value by key (e.g., chunking.overlap_secs)
    Get {
        /// Dotted key path (e.g., asr.model, pacing.delay_ms)
        key: String,
    },
    /// List the effective configuration (file, defaults and environment)
    List,
    /// Dump the default configuration as a template
    Dump,
    /// Print the configuration file path
    Path,
}
