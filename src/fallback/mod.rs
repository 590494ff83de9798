//! Fallback transcription for sources without usable captions.
//!
//! ```text
//! ┌────────────┐    ┌───────────┐    ┌─────────┐    ┌────────────┐    ┌──────────┐
//! │ Downloader │───▶│  Bitrate  │───▶│ Planner │───▶│ Recognizer │───▶│ Stitcher │───▶ Outcome
//! │ (buffered) │    │ Estimator │    │         │    │ (in order) │    │          │
//! └────────────┘    └───────────┘    └─────────┘    └────────────┘    └──────────┘
//!                                                         ▲
//!                                                         │
//!                                                       Pacer
//! ```

pub mod bitrate;
pub mod pacing;
pub mod pipeline;
pub mod planner;
pub mod stitcher;

pub use bitrate::BitrateEstimate;
pub use pacing::{FixedDelayPacer, Pacer, TokenBucketPacer, pacer_from_config};
pub use pipeline::{ChunkResult, FallbackPipeline, FallbackRequest};
pub use planner::{ByteRange, ChunkPlan, ChunkSpec};
pub use stitcher::{Stitcher, StitcherConfig};
