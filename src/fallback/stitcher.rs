//! Stitcher for combining per-chunk transcriptions.
//!
//! Chunks are appended in plan order as they arrive. Because consecutive
//! chunks share an overlap region, the recognizer usually transcribes the
//! boundary twice. When the leading window of a new chunk exactly repeats the
//! trailing window of the transcript (case-insensitive, whitespace tokens),
//! the repeat is dropped. Anything short of an exact match is appended as is.

use crate::defaults;

/// Configuration for the stitcher.
#[derive(Debug, Clone)]
pub struct StitcherConfig {
    /// Number of tokens compared at each boundary. Zero disables deduplication.
    pub dedup_window: usize,
}

impl Default for StitcherConfig {
    fn default() -> Self {
        Self {
            dedup_window: defaults::DEDUP_WINDOW_TOKENS,
        }
    }
}

/// Accumulates chunk texts into one transcript.
#[derive(Debug, Clone)]
pub struct Stitcher {
    config: StitcherConfig,
    transcript: String,
    segments: usize,
    deduplicated: usize,
}

impl Stitcher {
    /// Creates a stitcher with the default window.
    pub fn new() -> Self {
        Self::with_config(StitcherConfig::default())
    }

    /// Creates a stitcher with custom configuration.
    pub fn with_config(config: StitcherConfig) -> Self {
        Self {
            config,
            transcript: String::new(),
            segments: 0,
            deduplicated: 0,
        }
    }

    /// Appends the next chunk's text.
    ///
    /// Segments are joined by a single space; the first segment gets no
    /// leading separator.
    pub fn push(&mut self, text: &str) {
        let mut segment = text;

        if self.segments > 0 && self.is_boundary_repeat(text) {
            segment = skip_tokens(text, self.config.dedup_window);
            self.deduplicated += 1;
        }

        if !self.transcript.is_empty() {
            self.transcript.push(' ');
        }
        self.transcript.push_str(segment);
        self.segments += 1;
    }

    /// Returns true if the head window of `text` repeats the transcript's tail window.
    fn is_boundary_repeat(&self, text: &str) -> bool {
        let window = self.config.dedup_window;
        if window == 0 {
            return false;
        }

        let tail: Vec<&str> = {
            let tokens: Vec<&str> = self.transcript.split_whitespace().collect();
            let start = tokens.len().saturating_sub(window);
            tokens[start..].to_vec()
        };
        let head: Vec<&str> = text.split_whitespace().take(window).collect();

        tail.len() == head.len()
            && tail
                .iter()
                .zip(&head)
                .all(|(a, b)| a.to_lowercase() == b.to_lowercase())
    }

    /// Transcript accumulated so far, untrimmed.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Number of segments appended.
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Number of boundaries where a repeat was dropped.
    pub fn deduplicated_count(&self) -> usize {
        self.deduplicated
    }

    /// Finishes stitching and returns the transcript trimmed at both ends.
    pub fn finish(self) -> String {
        self.transcript.trim().to_string()
    }
}

/// Slice of `text` after its first `n` whitespace tokens, with the whitespace
/// that followed them removed. The rest of the text is left untouched.
fn skip_tokens(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        rest = rest.trim_start();
        match rest.find(char::is_whitespace) {
            Some(end) => rest = &rest[end..],
            None => return "",
        }
    }
    rest.trim_start()
}

impl Default for Stitcher {
    fn default() -> Self {
        Self::new()
    }
}
