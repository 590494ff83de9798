//! yt-dlp integration.
//!
//! Metadata comes from `yt-dlp -J` (the info document, with the selected
//! audio format's fields merged in at the top level). Audio is streamed to
//! stdout with `-o -` and collected into memory.

use crate::config::SourceConfig;
use crate::defaults;
use crate::error::{Result, VidscribeError};
use crate::source::command::{CommandRunner, SystemCommandRunner};
use crate::source::media::{AudioDownloader, AudioStream, CaptionTrack, MediaInfo, MediaInspector};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Subset of the yt-dlp info document this crate reads.
#[derive(Debug, Deserialize)]
struct InfoDocument {
    id: String,
    title: Option<String>,
    duration: Option<f64>,
    /// Audio bitrate of the selected format, kbit/s.
    abr: Option<f64>,
    /// Total bitrate of the selected format, kbit/s.
    tbr: Option<f64>,
    ext: Option<String>,
    #[serde(default)]
    subtitles: BTreeMap<String, Vec<SubtitleFormat>>,
    #[serde(default)]
    automatic_captions: BTreeMap<String, Vec<SubtitleFormat>>,
}

#[derive(Debug, Deserialize)]
struct SubtitleFormat {
    ext: String,
    url: String,
}

/// Parse a yt-dlp `-J` document into `MediaInfo`.
pub fn parse_info(json: &[u8]) -> Result<MediaInfo> {
    let doc: InfoDocument = serde_json::from_slice(json).map_err(|e| VidscribeError::MediaInfo {
        message: format!("Unexpected yt-dlp output: {e}"),
    })?;

    let duration_seconds = doc
        .duration
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(|d| d as u64);

    let audio_bitrate_bps = doc
        .abr
        .or(doc.tbr)
        .filter(|kbps| kbps.is_finite() && *kbps > 0.0)
        .map(|kbps| (kbps * 1000.0).round() as u64);

    let mut caption_tracks = json3_tracks(&doc.subtitles, false);
    caption_tracks.extend(json3_tracks(&doc.automatic_captions, true));

    Ok(MediaInfo {
        id: doc.id,
        title: doc.title,
        duration_seconds,
        audio_bitrate_bps,
        audio_ext: doc.ext,
        caption_tracks,
    })
}

fn json3_tracks(
    tracks: &BTreeMap<String, Vec<SubtitleFormat>>,
    automatic: bool,
) -> Vec<CaptionTrack> {
    tracks
        .iter()
        .filter(|(language, _)| language.as_str() != "live_chat")
        .filter_map(|(language, formats)| {
            formats
                .iter()
                .find(|f| f.ext == "json3")
                .map(|f| CaptionTrack {
                    language: language.clone(),
                    url: f.url.clone(),
                    automatic,
                })
        })
        .collect()
}

/// yt-dlp backed inspector and downloader.
pub struct YtDlp {
    binary: String,
    format: String,
    runner: Arc<dyn CommandRunner>,
}

impl YtDlp {
    pub fn new(config: &SourceConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemCommandRunner::new()))
    }

    pub fn with_runner(config: &SourceConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            binary: config.ytdlp_binary.clone(),
            format: config.format.clone(),
            runner,
        }
    }

    fn info_args(&self, url: &str) -> Vec<String> {
        [
            "-J",
            "--no-warnings",
            "--no-playlist",
            "-f",
            self.format.as_str(),
            url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn download_args(&self, url: &str) -> Vec<String> {
        [
            "--quiet",
            "--no-warnings",
            "--no-playlist",
            "--no-part",
            "-f",
            self.format.as_str(),
            "-o",
            "-",
            url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Keeps `ToolNotFound` as is and wraps everything else.
    fn wrap(err: VidscribeError, wrap: fn(String) -> VidscribeError) -> VidscribeError {
        match err {
            VidscribeError::ToolNotFound { .. } => err,
            other => wrap(other.to_string()),
        }
    }
}

#[async_trait]
impl MediaInspector for YtDlp {
    async fn inspect(&self, url: &str) -> Result<MediaInfo> {
        let stdout = self
            .runner
            .run(&self.binary, &self.info_args(url))
            .await
            .map_err(|e| Self::wrap(e, |message| VidscribeError::MediaInfo { message }))?;

        let info = parse_info(&stdout)?;
        debug!(
            id = %info.id,
            duration = ?info.duration_seconds,
            bitrate = ?info.audio_bitrate_bps,
            captions = info.caption_tracks.len(),
            "Inspected media"
        );
        Ok(info)
    }
}

#[async_trait]
impl AudioDownloader for YtDlp {
    async fn download(&self, url: &str) -> Result<AudioStream> {
        let info = self
            .inspect(url)
            .await
            .map_err(|e| Self::wrap(e, |message| VidscribeError::Download { message }))?;

        let bytes = self
            .runner
            .run(&self.binary, &self.download_args(url))
            .await
            .map_err(|e| Self::wrap(e, |message| VidscribeError::Download { message }))?;

        let extension = info
            .audio_ext
            .as_deref()
            .unwrap_or(defaults::DEFAULT_AUDIO_EXT);
        info!(
            id = %info.id,
            bytes = bytes.len(),
            ext = extension,
            "Downloaded audio"
        );

        Ok(AudioStream::new(bytes, info.audio_bitrate_bps, extension))
    }
}
