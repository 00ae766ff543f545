//! Segment planning and filter-graph resolution module

use serde::{Deserialize, Serialize};

pub mod segments;
pub mod transform;

pub use segments::SegmentPlanner;
pub use transform::{ResolvedTransform, TransformResolver};

/// How a trimmed selection divides into fixed-length segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPlan {
    /// Source position where the selection begins
    pub start_ms: u64,
    /// Length of every segment except possibly the last
    pub segment_length_ms: u64,
    /// Number of output segments (0 for an empty selection)
    pub segment_count: usize,
    /// Length of the final segment
    pub last_segment_length_ms: u64,
}

/// One planned output segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub offset_ms: u64,
    pub duration_ms: u64,
}

impl SegmentPlan {
    /// Total selected duration covered by the plan
    pub fn total_duration_ms(&self) -> u64 {
        match self.segment_count {
            0 => 0,
            n => self.segment_length_ms * (n as u64 - 1) + self.last_segment_length_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segment_count == 0
    }

    /// Planned segments in temporal order
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.segment_count).map(move |index| Segment {
            index,
            offset_ms: self.start_ms + self.segment_length_ms * index as u64,
            duration_ms: if index + 1 == self.segment_count {
                self.last_segment_length_ms
            } else {
                self.segment_length_ms
            },
        })
    }

    /// Per-segment durations in order
    pub fn durations(&self) -> Vec<u64> {
        self.segments().map(|segment| segment.duration_ms).collect()
    }
}
