//! Encode job construction

use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::model::VideoAsset;
use crate::engine::{EncodeJob, JobSet, JobSettings, JobStrategy};
use crate::error::{SliceError, SliceResult};
use crate::planner::{ResolvedTransform, Segment, SegmentPlan};
use crate::utils::time::TimeCode;

/// Builds encoder invocations from a segment plan
pub struct JobBuilder {
    settings: JobSettings,
}

impl JobBuilder {
    /// Create a new job builder
    pub fn new(settings: JobSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Build the job set for a plan.
    ///
    /// Without a filter the whole range is one stream-copy job split by the
    /// segment muxer. With a filter every segment is re-encoded on its own,
    /// sharing the same filter graph.
    pub fn build(
        &self,
        asset: &VideoAsset,
        plan: &SegmentPlan,
        transform: &ResolvedTransform,
    ) -> SliceResult<JobSet> {
        if plan.is_empty() {
            return Err(SliceError::configuration(
                "the selected range is empty; nothing to split",
            ));
        }

        let job_set = match transform.filter() {
            None => JobSet {
                strategy: JobStrategy::StreamCopy,
                jobs: vec![self.stream_copy_job(asset, plan)],
            },
            Some(filter_graph) => JobSet {
                strategy: JobStrategy::Reencode,
                jobs: plan
                    .segments()
                    .map(|segment| self.reencode_job(asset, plan, segment, filter_graph))
                    .collect(),
            },
        };

        info!(
            "Built {} {:?} job(s) for {}",
            job_set.len(),
            job_set.strategy,
            asset.filename
        );
        for job in &job_set.jobs {
            debug!("Job {} args: {:?}", job.index, job.args);
        }
        Ok(job_set)
    }

    /// `%03d` pattern handed to the segment muxer
    pub fn segment_pattern(&self, asset: &VideoAsset) -> PathBuf {
        self.settings
            .output_dir
            .join(format!("{}%03d.{}", asset.stem(), self.settings.extension))
    }

    /// Output path of one re-encoded segment, matching the muxer's numbering
    pub fn segment_path(&self, asset: &VideoAsset, index: usize) -> PathBuf {
        self.settings
            .output_dir
            .join(format!("{}{:03}.{}", asset.stem(), index, self.settings.extension))
    }

    fn input_args(asset: &VideoAsset, offset_ms: u64, duration_ms: u64) -> Vec<String> {
        vec![
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            TimeCode::format_arg(offset_ms),
            "-t".to_string(),
            TimeCode::format_arg(duration_ms),
            "-i".to_string(),
            asset.uri.to_string_lossy().to_string(),
        ]
    }

    fn stream_copy_job(&self, asset: &VideoAsset, plan: &SegmentPlan) -> EncodeJob {
        let duration_ms = plan.total_duration_ms();
        let output_path = self.segment_pattern(asset);

        let segment_time = TimeCode::format_seconds(plan.segment_length_ms);

        let mut args = Self::input_args(asset, plan.start_ms, duration_ms);
        args.extend(
            [
                "-c",
                "copy",
                "-map",
                "0",
                "-segment_time",
                segment_time.as_str(),
                "-f",
                "segment",
                "-reset_timestamps",
                "1",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(output_path.to_string_lossy().to_string());

        EncodeJob {
            index: 0,
            source_offset_ms: plan.start_ms,
            duration_ms,
            filter_graph: None,
            output_path,
            strategy: JobStrategy::StreamCopy,
            args,
        }
    }

    fn reencode_job(
        &self,
        asset: &VideoAsset,
        plan: &SegmentPlan,
        segment: Segment,
        filter_graph: &str,
    ) -> EncodeJob {
        let output_path = self.segment_path(asset, segment.index);
        let key_frames = format!(
            "expr:gte(t,n_forced*{})",
            TimeCode::format_seconds(plan.segment_length_ms)
        );

        let crf = self.settings.crf.to_string();
        let gop = self.settings.gop.to_string();

        let mut args = Self::input_args(asset, segment.offset_ms, segment.duration_ms);
        args.extend(
            [
                "-c:v",
                self.settings.video_codec.as_str(),
                "-crf",
                crf.as_str(),
                "-vf",
                filter_graph,
                "-g",
                gop.as_str(),
                "-sc_threshold",
                "0",
                "-force_key_frames",
                key_frames.as_str(),
                "-c:a",
                "copy",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(output_path.to_string_lossy().to_string());

        EncodeJob {
            index: segment.index,
            source_offset_ms: segment.offset_ms,
            duration_ms: segment.duration_ms,
            filter_graph: Some(filter_graph.to_string()),
            output_path,
            strategy: JobStrategy::Reencode,
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Rotation, Scale, TransformSpec, TrimRange};
    use crate::planner::{SegmentPlanner, TransformResolver};

    fn asset() -> VideoAsset {
        VideoAsset::new("/videos/clip.mp4", Some("clip.mp4".to_string()), 125_000)
    }

    fn builder() -> JobBuilder {
        JobBuilder::new(JobSettings {
            output_dir: PathBuf::from("/out"),
            ..JobSettings::default()
        })
    }

    fn plan(start: u64, end: u64) -> SegmentPlan {
        SegmentPlanner::plan(&TrimRange::new(start, end, 125_000).unwrap(), 30_000).unwrap()
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> &'a str {
        let position = args.iter().position(|a| a == flag).unwrap();
        &args[position + 1]
    }

    #[test]
    fn test_no_filter_builds_single_stream_copy_job() {
        let transform = TransformResolver::resolve(&TransformSpec::default());
        let set = builder().build(&asset(), &plan(0, 125_000), &transform).unwrap();

        assert_eq!(set.strategy, JobStrategy::StreamCopy);
        assert_eq!(set.len(), 1);
        let job = &set.jobs[0];
        assert_eq!(job.filter_graph, None);
        assert_eq!(job.output_path, PathBuf::from("/out/clip%03d.mp4"));
        assert_eq!(
            job.args,
            vec![
                "-loglevel", "error", "-y", "-ss", "00:00:00", "-t", "00:02:05", "-i",
                "/videos/clip.mp4", "-c", "copy", "-map", "0", "-segment_time", "30", "-f",
                "segment", "-reset_timestamps", "1", "/out/clip%03d.mp4",
            ]
        );
    }

    #[test]
    fn test_filter_builds_one_job_per_segment() {
        let transform =
            TransformResolver::resolve(&TransformSpec::new(Rotation::Cw90, Scale::P720));
        let set = builder().build(&asset(), &plan(0, 125_000), &transform).unwrap();

        assert_eq!(set.strategy, JobStrategy::Reencode);
        assert_eq!(set.len(), 5);
        let offsets: Vec<u64> = set.jobs.iter().map(|j| j.source_offset_ms).collect();
        assert_eq!(offsets, vec![0, 30_000, 60_000, 90_000, 120_000]);
        let durations: Vec<u64> = set.jobs.iter().map(|j| j.duration_ms).collect();
        assert_eq!(durations, vec![30_000, 30_000, 30_000, 30_000, 5_000]);

        for job in &set.jobs {
            assert_eq!(job.filter_graph.as_deref(), Some("transpose=1,scale=1280:-1"));
            assert_eq!(value_after(&job.args, "-vf"), "transpose=1,scale=1280:-1");
            assert_eq!(value_after(&job.args, "-sc_threshold"), "0");
            assert_eq!(
                value_after(&job.args, "-force_key_frames"),
                "expr:gte(t,n_forced*30)"
            );
            assert_eq!(value_after(&job.args, "-c:a"), "copy");
        }
        let last = &set.jobs[4];
        assert_eq!(value_after(&last.args, "-ss"), "00:02:00");
        assert_eq!(value_after(&last.args, "-t"), "00:00:05");
        assert_eq!(last.output_path, PathBuf::from("/out/clip004.mp4"));
        assert_eq!(last.args.last().unwrap(), "/out/clip004.mp4");
    }

    #[test]
    fn test_sub_second_trim_keeps_precision() {
        let transform = TransformResolver::resolve(&TransformSpec::default());
        let set = builder().build(&asset(), &plan(1_500, 31_750), &transform).unwrap();
        let args = &set.jobs[0].args;
        assert_eq!(value_after(args, "-ss"), "00:00:01.500");
        assert_eq!(value_after(args, "-t"), "00:00:30.250");
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        let transform = TransformResolver::resolve(&TransformSpec::default());
        let err = builder()
            .build(&asset(), &plan(10_000, 10_000), &transform)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_settings_flow_into_reencode_args() {
        let builder = JobBuilder::new(JobSettings {
            output_dir: PathBuf::from("/out"),
            extension: "mov".to_string(),
            video_codec: "libx265".to_string(),
            crf: 28,
            gop: 48,
        });
        let transform =
            TransformResolver::resolve(&TransformSpec::new(Rotation::Half, Scale::Native));
        let set = builder.build(&asset(), &plan(0, 20_000), &transform).unwrap();
        let args = &set.jobs[0].args;
        assert_eq!(value_after(args, "-c:v"), "libx265");
        assert_eq!(value_after(args, "-crf"), "28");
        assert_eq!(value_after(args, "-g"), "48");
        assert_eq!(set.jobs[0].output_path, PathBuf::from("/out/clip000.mov"));
    }
}
