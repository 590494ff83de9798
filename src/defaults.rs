//! Default configuration constants for vidscribe.
//!
//! Shared between the config file defaults, the CLI and the pipeline types so
//! every entry point agrees on the same numbers.

/// Minimum byte rate assumed for any audio stream, in bytes per second.
///
/// A missing or tiny reported bitrate would otherwise produce very few,
/// very large chunks that overrun the recognition service's upload limit.
pub const FLOOR_BYTES_PER_SEC: u64 = 16_000;

/// Target duration of one recognition chunk, in seconds (10 minutes).
pub const TARGET_CHUNK_SECS: u64 = 600;

/// Duration duplicated between consecutive chunks, in seconds.
///
/// Words spoken exactly at a boundary end up complete in at least one chunk.
pub const OVERLAP_SECS: u64 = 2;

/// Number of tokens compared at chunk boundaries when stitching.
pub const DEDUP_WINDOW_TOKENS: usize = 12;

/// Delay inserted between consecutive recognition calls, in milliseconds.
pub const PACING_DELAY_MS: u64 = 800;

/// Longest source accepted for transcription, in seconds (3 hours).
pub const MAX_DURATION_SECS: u64 = 3 * 60 * 60;

/// Recognition service endpoint.
pub const ASR_BASE_URL: &str = "https://api.openai.com/v1";

/// Recognition model name.
pub const ASR_MODEL: &str = "whisper-1";

/// yt-dlp executable name.
pub const YTDLP_BINARY: &str = "yt-dlp";

/// yt-dlp format selector: best audio-only stream.
pub const AUDIO_FORMAT: &str = "bestaudio";

/// Container assumed when the source does not report one.
pub const DEFAULT_AUDIO_EXT: &str = "webm";

/// Caption language tried first when the caller did not ask for one.
pub const CAPTION_LANGUAGE: &str = "en";

/// Language reported back when the caller let the service auto-detect.
pub const AUTO_LANGUAGE: &str = "auto";

/// Default HTTP listen address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP listen port.
pub const SERVER_PORT: u16 = 8080;

/// Largest accepted HTTP request body, in bytes.
pub const MAX_REQUEST_BODY_BYTES: usize = 50 * 1024 * 1024;
