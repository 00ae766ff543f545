//! Segment count and duration planning

use tracing::debug;

use crate::domain::model::TrimRange;
use crate::error::{SliceError, SliceResult};
use crate::planner::SegmentPlan;
use crate::utils::time::TimeCode;

/// Planner dividing a trim range into fixed-length segments
pub struct SegmentPlanner;

impl SegmentPlanner {
    /// Plan with a segment length given in seconds.
    ///
    /// NaN, infinite, zero and negative lengths are configuration errors.
    pub fn plan_seconds(trim: &TrimRange, segment_secs: f64) -> SliceResult<SegmentPlan> {
        let segment_length_ms = TimeCode::seconds_to_ms(segment_secs).ok_or_else(|| {
            SliceError::configuration(format!("segment length {} is not usable", segment_secs))
        })?;
        Self::plan(trim, segment_length_ms)
    }

    /// Plan with a segment length in milliseconds
    pub fn plan(trim: &TrimRange, segment_length_ms: u64) -> SliceResult<SegmentPlan> {
        if segment_length_ms == 0 {
            return Err(SliceError::configuration(
                "segment length must be greater than zero",
            ));
        }

        let selected_ms = trim.selected_duration_ms();
        let segment_count = selected_ms.div_ceil(segment_length_ms) as usize;
        let last_segment_length_ms = match segment_count {
            0 => 0,
            n => selected_ms - segment_length_ms * (n as u64 - 1),
        };

        let plan = SegmentPlan {
            start_ms: trim.start_ms(),
            segment_length_ms,
            segment_count,
            last_segment_length_ms,
        };

        debug!(
            "Planned {} segment(s) of {}ms over {}ms (last {}ms)",
            plan.segment_count, segment_length_ms, selected_ms, last_segment_length_ms
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u64, end: u64) -> TrimRange {
        TrimRange::new(start, end, end.max(1)).unwrap()
    }

    #[test]
    fn test_plan_divides_with_short_tail() {
        let plan = SegmentPlanner::plan(&range(0, 125_000), 30_000).unwrap();
        assert_eq!(plan.segment_count, 5);
        assert_eq!(plan.last_segment_length_ms, 5_000);
        assert_eq!(plan.durations(), vec![30_000, 30_000, 30_000, 30_000, 5_000]);
    }

    #[test]
    fn test_plan_exact_multiple() {
        let plan = SegmentPlanner::plan(&range(0, 90_000), 30_000).unwrap();
        assert_eq!(plan.durations(), vec![30_000, 30_000, 30_000]);
    }

    #[test]
    fn test_plan_length_longer_than_selection() {
        let plan = SegmentPlanner::plan(&range(2_000, 12_000), 30_000).unwrap();
        assert_eq!(plan.segment_count, 1);
        assert_eq!(plan.durations(), vec![10_000]);
        assert_eq!(plan.segments().next().unwrap().offset_ms, 2_000);
    }

    #[test]
    fn test_plan_empty_selection() {
        let plan = SegmentPlanner::plan(&range(5_000, 5_000), 30_000).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.last_segment_length_ms, 0);
        assert_eq!(plan.segments().count(), 0);
    }

    #[test]
    fn test_plan_offsets_follow_trim_start() {
        let plan = SegmentPlanner::plan(&range(10_000, 75_000), 20_000).unwrap();
        let offsets: Vec<u64> = plan.segments().map(|s| s.offset_ms).collect();
        assert_eq!(offsets, vec![10_000, 30_000, 50_000, 70_000]);
    }

    #[test]
    fn test_plan_rejects_bad_lengths() {
        let trim = range(0, 10_000);
        assert!(SegmentPlanner::plan(&trim, 0).unwrap_err().is_configuration());
        for secs in [f64::NAN, f64::INFINITY, -3.0] {
            assert!(SegmentPlanner::plan_seconds(&trim, secs)
                .unwrap_err()
                .is_configuration());
        }
        assert!(SegmentPlanner::plan_seconds(&trim, 0.0).is_err());
    }

    #[test]
    fn test_durations_sum_to_selection() {
        for selected in [0u64, 1, 999, 1_000, 29_999, 30_000, 30_001, 125_000, 3_600_123] {
            for length in [1u64, 7, 1_000, 2_500, 30_000, 60_000, 5_000_000] {
                let plan = SegmentPlanner::plan(&range(0, selected), length).unwrap();
                let durations = plan.durations();
                assert_eq!(durations.iter().sum::<u64>(), selected);
                assert_eq!(plan.total_duration_ms(), selected);
                if let Some((_, head)) = durations.split_last() {
                    assert!(head.iter().all(|d| *d == length));
                }
                assert!(durations.iter().all(|d| *d > 0));
            }
        }
    }
}
