//! Captions fast path.
//!
//! When the source already publishes captions there is no need to download
//! and recognize audio. Tracks are picked by language, fetched in YouTube's
//! json3 format, and flattened into a single line of text.

use crate::error::{Result, VidscribeError};
use crate::source::media::{CaptionTrack, MediaInfo};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// One timed caption cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionFragment {
    pub text: String,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl CaptionFragment {
    pub fn new(text: &str, start_ms: u64, duration_ms: u64) -> Self {
        Self {
            text: text.to_string(),
            start_ms,
            duration_ms,
        }
    }
}

/// Trait for fetching the caption cues of a media source.
#[async_trait]
pub trait CaptionFetcher: Send + Sync {
    /// Fetch cues, preferring `language`. An empty list means no usable captions.
    async fn fetch(&self, info: &MediaInfo, language: &str) -> Result<Vec<CaptionFragment>>;
}

fn matches_language(track: &CaptionTrack, language: &str) -> bool {
    let code = track.language.to_ascii_lowercase();
    let wanted = language.to_ascii_lowercase();
    code == wanted || code.strip_prefix(&wanted).is_some_and(|rest| rest.starts_with('-'))
}

/// First track available when the requested language is missing.
///
/// Manual tracks win over automatic ones; among automatic tracks the
/// `-orig` one is the spoken language.
fn first_available(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| !t.automatic)
        .or_else(|| tracks.iter().find(|t| t.language.ends_with("-orig")))
        .or_else(|| tracks.first())
}

/// Pick the track to use for `language`.
///
/// Order: manual track in that language, automatic track in that language,
/// then the first available track.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| !t.automatic && matches_language(t, language))
        .or_else(|| {
            tracks
                .iter()
                .find(|t| t.automatic && matches_language(t, language))
        })
        .or_else(|| first_available(tracks))
}

/// Tracks to try in order: the selected one, then the first available if it differs.
fn candidate_tracks<'a>(tracks: &'a [CaptionTrack], language: &str) -> Vec<&'a CaptionTrack> {
    let mut candidates: Vec<&CaptionTrack> = select_track(tracks, language).into_iter().collect();
    if let Some(first) = first_available(tracks)
        && !candidates.contains(&first)
    {
        candidates.push(first);
    }
    candidates
}

/// Join cue texts with single spaces.
///
/// Every whitespace run collapses to one space and the result is trimmed.
pub fn join_fragments(fragments: &[CaptionFragment]) -> String {
    fragments
        .iter()
        .flat_map(|f| f.text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Parse a json3 caption document into cues, skipping blank events.
pub fn parse_json3(body: &[u8]) -> Result<Vec<CaptionFragment>> {
    let doc: Json3Document = serde_json::from_slice(body).map_err(|e| VidscribeError::Captions {
        message: format!("Invalid json3 document: {e}"),
    })?;

    Ok(doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            if text.trim().is_empty() {
                None
            } else {
                Some(CaptionFragment {
                    text,
                    start_ms: event.t_start_ms,
                    duration_ms: event.d_duration_ms,
                })
            }
        })
        .collect())
}

/// Fetches json3 tracks listed in `MediaInfo` over HTTP.
#[derive(Debug, Clone, Default)]
pub struct Json3CaptionFetcher {
    client: Client,
}

impl Json3CaptionFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionFragment>> {
        let response = self
            .client
            .get(&track.url)
            .send()
            .await
            .map_err(|e| VidscribeError::Captions {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(VidscribeError::Captions {
                message: format!(
                    "Track {} returned status {}",
                    track.language,
                    response.status()
                ),
            });
        }

        let body = response.bytes().await.map_err(|e| VidscribeError::Captions {
            message: e.to_string(),
        })?;
        parse_json3(&body)
    }
}

#[async_trait]
impl CaptionFetcher for Json3CaptionFetcher {
    async fn fetch(&self, info: &MediaInfo, language: &str) -> Result<Vec<CaptionFragment>> {
        for track in candidate_tracks(&info.caption_tracks, language) {
            debug!(
                language = %track.language,
                automatic = track.automatic,
                "Fetching caption track"
            );
            let fragments = self.fetch_track(track).await?;
            if !fragments.is_empty() {
                return Ok(fragments);
            }
        }
        Ok(Vec::new())
    }
}

/// Mock caption fetcher for testing
#[derive(Debug)]
pub struct MockCaptionFetcher {
    outcome: std::result::Result<Vec<CaptionFragment>, String>,
    languages: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockCaptionFetcher {
    /// Create a mock that returns `fragments` for every source
    pub fn new(fragments: Vec<CaptionFragment>) -> Self {
        Self {
            outcome: Ok(fragments),
            languages: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock for sources without captions
    pub fn unavailable() -> Self {
        Self::new(Vec::new())
    }

    /// Create a mock whose fetches always fail
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            languages: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Language hints received so far
    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CaptionFetcher for MockCaptionFetcher {
    async fn fetch(&self, _info: &MediaInfo, language: &str) -> Result<Vec<CaptionFragment>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut languages) = self.languages.lock() {
            languages.push(language.to_string());
        }
        self.outcome
            .clone()
            .map_err(|message| VidscribeError::Captions { message })
    }
}
