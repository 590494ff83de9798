//! Chunk planning over a fully buffered audio stream.
//!
//! Converts time-based chunk targets into byte ranges using a byte-rate
//! estimate. Consecutive ranges share `overlap_bytes` so words spoken at a
//! boundary are captured whole by at least one chunk.

use crate::error::{Result, VidscribeError};
use crate::fallback::bitrate::BitrateEstimate;
use std::ops::Range;

/// Validated chunk and overlap sizes in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    chunk_bytes: u64,
    overlap_bytes: u64,
}

impl ChunkSpec {
    /// Builds a spec from byte sizes.
    ///
    /// Fails when the overlap is not strictly smaller than the chunk, since the
    /// planner could never advance.
    pub fn from_bytes(chunk_bytes: u64, overlap_bytes: u64) -> Result<Self> {
        if overlap_bytes >= chunk_bytes {
            return Err(VidscribeError::InvalidChunkPlan {
                chunk_bytes,
                overlap_bytes,
            });
        }
        Ok(Self {
            chunk_bytes,
            overlap_bytes,
        })
    }

    /// Builds a spec from durations and a byte-rate estimate.
    pub fn from_durations(
        estimate: BitrateEstimate,
        target_chunk_secs: u64,
        overlap_secs: u64,
    ) -> Result<Self> {
        Self::from_bytes(
            estimate.bytes_for_secs(target_chunk_secs),
            estimate.bytes_for_secs(overlap_secs),
        )
    }

    pub fn chunk_bytes(&self) -> u64 {
        self.chunk_bytes
    }

    pub fn overlap_bytes(&self) -> u64 {
        self.overlap_bytes
    }

    /// Distance between the starts of consecutive ranges.
    pub fn step_bytes(&self) -> u64 {
        self.chunk_bytes - self.overlap_bytes
    }
}

/// One planned slice of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: u64,
    pub length: u64,
}

impl ByteRange {
    /// Exclusive end offset.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// The range as slice indices.
    pub fn as_usize_range(&self) -> Range<usize> {
        self.offset as usize..self.end() as usize
    }
}

/// Ordered byte ranges covering `[0, stream_length)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    ranges: Vec<ByteRange>,
    stream_length: u64,
    spec: ChunkSpec,
}

impl ChunkPlan {
    /// Plans chunks for a stream of `stream_length` bytes.
    ///
    /// An empty stream yields an empty plan. A stream no longer than one chunk
    /// yields exactly one range covering all of it.
    pub fn new(stream_length: u64, spec: ChunkSpec) -> Self {
        let step = spec.step_bytes();
        let mut ranges = Vec::new();
        let mut offset = 0u64;

        while offset < stream_length {
            let end = offset.saturating_add(spec.chunk_bytes).min(stream_length);
            ranges.push(ByteRange {
                offset,
                length: end - offset,
            });
            if end >= stream_length {
                break;
            }
            offset += step;
        }

        Self {
            ranges,
            stream_length,
            spec,
        }
    }

    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn stream_length(&self) -> u64 {
        self.stream_length
    }

    pub fn spec(&self) -> ChunkSpec {
        self.spec
    }

    pub fn iter(&self) -> impl Iterator<Item = &ByteRange> {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(chunk: u64, overlap: u64) -> ChunkSpec {
        ChunkSpec::from_bytes(chunk, overlap).unwrap()
    }

    fn assert_covers(plan: &ChunkPlan) {
        let len = plan.stream_length();
        if len == 0 {
            assert!(plan.is_empty());
            return;
        }
        let ranges = plan.ranges();
        assert_eq!(ranges[0].offset, 0, "plan must start at 0");
        assert_eq!(ranges.last().unwrap().end(), len, "plan must end at stream length");
        for range in ranges {
            assert!(range.length > 0, "zero-length range in {:?}", ranges);
            assert!(range.length <= plan.spec().chunk_bytes());
        }
        for pair in ranges.windows(2) {
            assert!(pair[1].offset > pair[0].offset, "offsets must increase");
            assert!(pair[1].offset <= pair[0].end(), "gap between {:?}", pair);
        }
    }

    #[test]
    fn empty_stream_yields_empty_plan() {
        let plan = ChunkPlan::new(0, spec(100, 10));
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }

    #[test]
    fn short_stream_yields_single_range() {
        for len in [1, 50, 99, 100] {
            let plan = ChunkPlan::new(len, spec(100, 10));
            assert_eq!(
                plan.ranges(),
                &[ByteRange {
                    offset: 0,
                    length: len
                }]
            );
        }
    }

    #[test]
    fn consecutive_ranges_overlap_by_overlap_size() {
        let plan = ChunkPlan::new(1000, spec(100, 10));
        for pair in plan.ranges().windows(2) {
            assert_eq!(pair[0].end() - pair[1].offset, 10);
        }
    }

    #[test]
    fn final_range_is_clamped_to_stream_length() {
        // step 90: 0..100, 90..190, 180..250
        let plan = ChunkPlan::new(250, spec(100, 10));
        assert_eq!(
            plan.ranges(),
            &[
                ByteRange {
                    offset: 0,
                    length: 100
                },
                ByteRange {
                    offset: 90,
                    length: 100
                },
                ByteRange {
                    offset: 180,
                    length: 70
                },
            ]
        );
    }

    #[test]
    fn stops_once_a_range_reaches_the_end() {
        // 0..100 and 90..190 already cover 190 bytes exactly; no trailing sliver.
        let plan = ChunkPlan::new(190, spec(100, 10));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.ranges()[1].end(), 190);
    }

    #[test]
    fn ranges_cover_stream_for_many_lengths() {
        for (chunk, overlap) in [(100, 10), (100, 0), (7, 6), (1, 0), (64, 63)] {
            let spec = spec(chunk, overlap);
            for len in 0..500 {
                assert_covers(&ChunkPlan::new(len, spec));
            }
        }
    }

    #[test]
    fn overlap_equal_to_chunk_is_rejected() {
        let err = ChunkSpec::from_bytes(100, 100).unwrap_err();
        assert!(matches!(
            err,
            VidscribeError::InvalidChunkPlan {
                chunk_bytes: 100,
                overlap_bytes: 100
            }
        ));
    }

    #[test]
    fn overlap_larger_than_chunk_is_rejected() {
        assert!(ChunkSpec::from_bytes(10, 20).is_err());
        assert!(ChunkSpec::from_bytes(0, 0).is_err());
    }

    #[test]
    fn spec_from_durations() {
        let estimate = BitrateEstimate::with_default_floor(None);
        let spec = ChunkSpec::from_durations(estimate, 600, 2).unwrap();
        assert_eq!(spec.chunk_bytes(), 9_600_000);
        assert_eq!(spec.overlap_bytes(), 32_000);
        assert_eq!(spec.step_bytes(), 9_568_000);
    }

    #[test]
    fn one_megabyte_at_floor_rate_is_one_chunk() {
        let estimate = BitrateEstimate::with_default_floor(None);
        let spec = ChunkSpec::from_durations(estimate, 600, 2).unwrap();
        let plan = ChunkPlan::new(1_000_000, spec);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.ranges()[0].as_usize_range(), 0..1_000_000);
    }

    #[test]
    fn twenty_minutes_at_floor_rate_is_three_chunks() {
        let estimate = BitrateEstimate::with_default_floor(None);
        let spec = ChunkSpec::from_durations(estimate, 600, 2).unwrap();
        let plan = ChunkPlan::new(16_000 * 1200, spec);
        assert_eq!(plan.len(), 3);
        assert_covers(&plan);
    }
}
