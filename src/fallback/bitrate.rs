//! Byte-rate estimation for encoded audio streams.

use crate::defaults;
use std::fmt;

/// Estimated byte rate of an audio stream, in bytes per second.
///
/// Always at least the floor it was estimated with, so it is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BitrateEstimate(u64);

impl BitrateEstimate {
    /// Estimates the byte rate from a reported bitrate in bits per second.
    ///
    /// Missing, zero, or implausibly small bitrates clamp to `floor_bytes_per_sec`.
    /// A zero floor is raised to one byte per second.
    pub fn from_bitrate(reported_bits_per_sec: Option<u64>, floor_bytes_per_sec: u64) -> Self {
        let reported = reported_bits_per_sec.unwrap_or(0) / 8;
        Self(reported.max(floor_bytes_per_sec).max(1))
    }

    /// Estimates with the default floor.
    pub fn with_default_floor(reported_bits_per_sec: Option<u64>) -> Self {
        Self::from_bitrate(reported_bits_per_sec, defaults::FLOOR_BYTES_PER_SEC)
    }

    /// Bytes per second.
    pub fn bytes_per_sec(self) -> u64 {
        self.0
    }

    /// Number of bytes that cover `secs` seconds of audio.
    pub fn bytes_for_secs(self, secs: u64) -> u64 {
        self.0.saturating_mul(secs)
    }
}

impl fmt::Display for BitrateEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} B/s", self.0)
    }
}
