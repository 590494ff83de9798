//! Fallback pipeline orchestrator.
//!
//! Download → estimate → plan → recognize each range in order → stitch.
//! Chunks are recognized strictly one after another so the stitcher always
//! sees results in plan order. Any failure aborts the whole attempt and the
//! partial transcript is dropped.

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::fallback::bitrate::BitrateEstimate;
use crate::fallback::pacing::Pacer;
use crate::fallback::planner::{ChunkPlan, ChunkSpec};
use crate::fallback::stitcher::{Stitcher, StitcherConfig};
use crate::source::media::{AudioDownloader, AudioStream};
use crate::stt::recognizer::{AudioChunk, Recognizer};
use crate::types::{TranscriptSource, TranscriptionOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Recognized text of one planned chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    /// Position of the chunk in the plan.
    pub index: usize,
    /// Recognized text, trimmed.
    pub text: String,
}

/// Inputs of one fallback run that come from outside the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct FallbackRequest<'a> {
    pub url: &'a str,
    /// Language forced on the recognizer; `None` means auto-detect.
    pub forced_language: Option<&'a str>,
    /// Language reported in the outcome.
    pub language: &'a str,
    /// Source length reported in the outcome.
    pub duration_seconds: u64,
}

/// Chunk-and-recognize transcription over downloaded audio.
pub struct FallbackPipeline {
    chunking: ChunkingConfig,
    downloader: Arc<dyn AudioDownloader>,
    recognizer: Arc<dyn Recognizer>,
    pacer: Arc<dyn Pacer>,
}

impl FallbackPipeline {
    /// Creates a pipeline.
    ///
    /// Fails when the chunking configuration cannot produce a valid plan even
    /// at the floor byte rate, so bad settings surface before any download.
    pub fn new(
        chunking: ChunkingConfig,
        downloader: Arc<dyn AudioDownloader>,
        recognizer: Arc<dyn Recognizer>,
        pacer: Arc<dyn Pacer>,
    ) -> Result<Self> {
        let floor = BitrateEstimate::from_bitrate(None, chunking.floor_bytes_per_sec);
        ChunkSpec::from_durations(floor, chunking.target_chunk_secs, chunking.overlap_secs)?;

        Ok(Self {
            chunking,
            downloader,
            recognizer,
            pacer,
        })
    }

    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }

    /// Byte-rate estimate for a stream with the given declared bitrate.
    pub fn estimate(&self, bitrate_bps: Option<u64>) -> BitrateEstimate {
        BitrateEstimate::from_bitrate(bitrate_bps, self.chunking.floor_bytes_per_sec)
    }

    /// Plans chunks for a stream of `stream_length` bytes.
    pub fn plan(&self, stream_length: u64, bitrate_bps: Option<u64>) -> Result<ChunkPlan> {
        let spec = ChunkSpec::from_durations(
            self.estimate(bitrate_bps),
            self.chunking.target_chunk_secs,
            self.chunking.overlap_secs,
        )?;
        Ok(ChunkPlan::new(stream_length, spec))
    }

    /// Recognizes one planned chunk.
    async fn recognize_chunk(
        &self,
        stream: &AudioStream,
        plan: &ChunkPlan,
        index: usize,
        forced_language: Option<&str>,
    ) -> Result<ChunkResult> {
        let range = plan.ranges()[index];
        let chunk = AudioChunk {
            index,
            bytes: &stream.bytes[range.as_usize_range()],
            media_type: stream.media_type(),
            extension: &stream.extension,
            language: forced_language,
        };

        let start = Instant::now();
        let text = self.recognizer.recognize(chunk).await?;
        let text = text.trim().to_string();
        debug!(
            chunk = index,
            of = plan.len(),
            offset = range.offset,
            bytes = range.length,
            chars = text.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chunk recognized"
        );

        Ok(ChunkResult { index, text })
    }

    /// Transcribes an already buffered stream.
    ///
    /// An empty stream yields an empty transcript without calling the recognizer.
    pub async fn transcribe_stream(
        &self,
        stream: &AudioStream,
        forced_language: Option<&str>,
    ) -> Result<String> {
        let plan = self.plan(stream.len() as u64, stream.bitrate_bps)?;
        info!(
            bytes = stream.len(),
            rate = %self.estimate(stream.bitrate_bps),
            chunks = plan.len(),
            chunk_bytes = plan.spec().chunk_bytes(),
            overlap_bytes = plan.spec().overlap_bytes(),
            model = self.recognizer.model_name(),
            "Planned fallback transcription"
        );

        let mut stitcher = Stitcher::with_config(StitcherConfig {
            dedup_window: self.chunking.dedup_window,
        });

        for index in 0..plan.len() {
            self.pacer.before_call().await;
            let result = self
                .recognize_chunk(stream, &plan, index, forced_language)
                .await?;
            stitcher.push(&result.text);

            if index + 1 < plan.len() {
                self.pacer.between_calls().await;
            }
        }

        if stitcher.deduplicated_count() > 0 {
            debug!(
                boundaries = stitcher.deduplicated_count(),
                "Dropped repeated boundary text"
            );
        }
        Ok(stitcher.finish())
    }

    /// Runs the whole fallback path for one request.
    pub async fn run(&self, request: &FallbackRequest<'_>) -> Result<TranscriptionOutcome> {
        let stream = self.downloader.download(request.url).await?;
        let transcript = self
            .transcribe_stream(&stream, request.forced_language)
            .await?;

        Ok(TranscriptionOutcome {
            transcript,
            language: request.language.to_string(),
            duration_seconds: request.duration_seconds,
            source: TranscriptSource::Asr,
        })
    }
}
