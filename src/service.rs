//! Transcription service: captions first, chunked recognition as fallback.
//!
//! One `TranscriptionService` is built at startup and shared by every
//! request. Requests do not share mutable state apart from the pacer, which
//! in token bucket mode is intentionally global.

use crate::config::Config;
use crate::error::{Result, VidscribeError};
use crate::fallback::pacing::{Pacer, pacer_from_config};
use crate::fallback::pipeline::{FallbackPipeline, FallbackRequest};
use crate::source::captions::{CaptionFetcher, Json3CaptionFetcher, join_fragments};
use crate::source::http::HttpAudioDownloader;
use crate::source::media::{AudioDownloader, BareUrlInspector, MediaInfo, MediaInspector};
use crate::source::video_id::extract_video_id;
use crate::source::ytdlp::YtDlp;
use crate::stt::openai::OpenAiRecognizer;
use crate::stt::recognizer::Recognizer;
use crate::types::{TranscribeOptions, TranscriptSource, TranscriptionOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How media is inspected and downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// yt-dlp for metadata, captions and audio.
    #[default]
    YtDlp,
    /// Plain HTTP GET of an audio file; no metadata, no captions.
    Direct,
}

pub struct TranscriptionService {
    inspector: Arc<dyn MediaInspector>,
    captions: Arc<dyn CaptionFetcher>,
    fallback: FallbackPipeline,
    max_duration_secs: u64,
    caption_language: String,
}

impl TranscriptionService {
    /// Assembles a service from its collaborators.
    pub fn new(
        config: &Config,
        inspector: Arc<dyn MediaInspector>,
        captions: Arc<dyn CaptionFetcher>,
        downloader: Arc<dyn AudioDownloader>,
        recognizer: Arc<dyn Recognizer>,
        pacer: Arc<dyn Pacer>,
    ) -> Result<Self> {
        config.validate()?;
        let fallback = FallbackPipeline::new(config.chunking.clone(), downloader, recognizer, pacer)?;

        Ok(Self {
            inspector,
            captions,
            fallback,
            max_duration_secs: config.source.max_duration_secs,
            caption_language: config.source.caption_language.clone(),
        })
    }

    /// Builds the production service: yt-dlp or direct HTTP sources, json3
    /// captions and the configured recognition endpoint.
    pub fn from_config(config: &Config, mode: SourceMode) -> Result<Self> {
        let recognizer = Arc::new(OpenAiRecognizer::new(&config.asr)?);
        let captions = Arc::new(Json3CaptionFetcher::new());
        let pacer = pacer_from_config(&config.pacing);

        match mode {
            SourceMode::YtDlp => {
                let ytdlp = Arc::new(YtDlp::new(&config.source));
                Self::new(config, ytdlp.clone(), captions, ytdlp, recognizer, pacer)
            }
            SourceMode::Direct => Self::new(
                config,
                Arc::new(BareUrlInspector),
                captions,
                Arc::new(HttpAudioDownloader::new()),
                recognizer,
                pacer,
            ),
        }
    }

    pub fn fallback(&self) -> &FallbackPipeline {
        &self.fallback
    }

    /// Transcribes the source at `url`.
    pub async fn transcribe(
        &self,
        url: &str,
        options: &TranscribeOptions,
    ) -> Result<TranscriptionOutcome> {
        let url = url.trim();
        if url.is_empty() {
            return Err(VidscribeError::MissingUrl);
        }

        let start = Instant::now();
        info!(url, "Transcription requested");

        let media = self.inspector.inspect(url).await?;
        let seconds = media.duration_seconds.unwrap_or(0);
        if seconds > self.max_duration_secs {
            return Err(VidscribeError::DurationExceeded {
                seconds,
                limit_secs: self.max_duration_secs,
            });
        }

        let language = options.reported_language();

        if let Some(video_id) = extract_video_id(url)
            && let Some(transcript) = self.try_captions(&video_id, &media, options).await
        {
            info!(
                video_id,
                chars = transcript.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Transcribed from captions"
            );
            return Ok(TranscriptionOutcome {
                transcript,
                language,
                duration_seconds: seconds,
                source: TranscriptSource::Captions,
            });
        }

        let outcome = self
            .fallback
            .run(&FallbackRequest {
                url,
                forced_language: options.forced_language(),
                language: &language,
                duration_seconds: seconds,
            })
            .await?;

        info!(
            chars = outcome.transcript.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Transcribed with speech recognition"
        );
        Ok(outcome)
    }

    /// Captions fast path. Any failure or an empty result yields `None`.
    async fn try_captions(
        &self,
        video_id: &str,
        media: &MediaInfo,
        options: &TranscribeOptions,
    ) -> Option<String> {
        let hint = options
            .requested_language()
            .unwrap_or(&self.caption_language);

        match self.captions.fetch(media, hint).await {
            Ok(fragments) => {
                let text = join_fragments(&fragments);
                if text.is_empty() {
                    debug!(video_id, "No usable captions");
                    None
                } else {
                    Some(text)
                }
            }
            Err(e) => {
                warn!(video_id, error = %e, "Caption fetch failed, using speech recognition");
                None
            }
        }
    }
}
