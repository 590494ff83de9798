//! Media metadata, buffered audio, and the traits that produce them.

use crate::defaults;
use crate::error::{Result, VidscribeError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A caption track advertised by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    /// Language code as reported by the source (e.g. `en`, `en-US`, `de-orig`).
    pub language: String,
    /// URL of the track in json3 format.
    pub url: String,
    /// True for machine-generated captions.
    pub automatic: bool,
}

/// Metadata of a remote media source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaInfo {
    pub id: String,
    pub title: Option<String>,
    /// Length in whole seconds, when the source reports one.
    pub duration_seconds: Option<u64>,
    /// Encoded bitrate of the selected audio format, in bits per second.
    pub audio_bitrate_bps: Option<u64>,
    /// Container extension of the selected audio format.
    pub audio_ext: Option<String>,
    pub caption_tracks: Vec<CaptionTrack>,
}

/// A fully buffered encoded audio stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    pub bytes: Vec<u8>,
    /// Declared encoding bitrate in bits per second, if known.
    pub bitrate_bps: Option<u64>,
    /// Container extension, e.g. `webm`.
    pub extension: String,
}

impl AudioStream {
    pub fn new(bytes: Vec<u8>, bitrate_bps: Option<u64>, extension: &str) -> Self {
        Self {
            bytes,
            bitrate_bps,
            extension: extension.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Media type sent to the recognition service.
    pub fn media_type(&self) -> &'static str {
        media_type_for_extension(&self.extension)
    }
}

/// Maps a container extension to the media type used for uploads.
///
/// Unknown extensions are treated as webm, which is what most web audio is.
pub fn media_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "m4a" | "mp4" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "ogg" | "opus" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        _ => "audio/webm",
    }
}

/// Maps a `Content-Type` header value back to a container extension.
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/mp4" | "audio/x-m4a" | "audio/m4a" | "video/mp4" => "m4a",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" | "audio/opus" => "ogg",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/flac" | "audio/x-flac" => "flac",
        _ => defaults::DEFAULT_AUDIO_EXT,
    }
}

/// Trait for looking up media metadata.
#[async_trait]
pub trait MediaInspector: Send + Sync {
    async fn inspect(&self, url: &str) -> Result<MediaInfo>;
}

#[async_trait]
impl<T: MediaInspector + ?Sized> MediaInspector for Arc<T> {
    async fn inspect(&self, url: &str) -> Result<MediaInfo> {
        (**self).inspect(url).await
    }
}

/// Inspector for plain audio URLs that carry no metadata.
///
/// Reports an unknown duration and no caption tracks, so such sources go
/// straight to the fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareUrlInspector;

#[async_trait]
impl MediaInspector for BareUrlInspector {
    async fn inspect(&self, url: &str) -> Result<MediaInfo> {
        Ok(MediaInfo {
            id: url.to_string(),
            ..MediaInfo::default()
        })
    }
}

/// Trait for downloading the audio of a media source into memory.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Download the whole audio stream. Blocks until every byte is buffered.
    async fn download(&self, url: &str) -> Result<AudioStream>;
}

/// Mock downloader for testing
#[derive(Debug)]
pub struct MockDownloader {
    outcome: std::result::Result<AudioStream, String>,
    calls: Mutex<Vec<String>>,
}

impl MockDownloader {
    /// Create a mock that returns `stream` for every URL
    pub fn new(stream: AudioStream) -> Self {
        Self {
            outcome: Ok(stream),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock whose downloads always fail
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AudioDownloader for MockDownloader {
    async fn download(&self, url: &str) -> Result<AudioStream> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        self.outcome
            .clone()
            .map_err(|message| VidscribeError::Download { message })
    }
}

#[async_trait]
impl<T: AudioDownloader + ?Sized> AudioDownloader for Arc<T> {
    async fn download(&self, url: &str) -> Result<AudioStream> {
        (**self).download(url).await
    }
}

/// Mock inspector for testing
#[derive(Debug, Clone)]
pub struct MockInspector {
    outcome: std::result::Result<MediaInfo, String>,
}

impl MockInspector {
    pub fn new(info: MediaInfo) -> Self {
        Self { outcome: Ok(info) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl MediaInspector for MockInspector {
    async fn inspect(&self, _url: &str) -> Result<MediaInfo> {
        self.outcome
            .clone()
            .map_err(|message| VidscribeError::MediaInfo { message })
    }
}
