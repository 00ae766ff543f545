//! Encode job construction and orchestration module

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SliceError;
use crate::ports::EncoderStatus;

pub mod cancel;
pub mod jobs;
pub mod orchestrator;

pub use cancel::{CancelHandle, CancelSignal};
pub use jobs::JobBuilder;
pub use orchestrator::{EncodeOrchestrator, RunPhase, RunResult, RunState};

/// Encoder settings shared by every job of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    /// Directory receiving the segments
    pub output_dir: PathBuf,
    /// Media extension of the segments, without the dot
    pub extension: String,
    /// Video codec for re-encoded segments
    pub video_codec: String,
    /// Constant Rate Factor (0-51)
    pub crf: u8,
    /// Key-frame interval in frames
    pub gop: u32,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("split-videos"),
            extension: "mp4".to_string(),
            video_codec: "libx264".to_string(),
            crf: 23,
            gop: 30,
        }
    }
}

/// How a job set produces its segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStrategy {
    /// One job; the container segment muxer splits without re-encoding
    StreamCopy,
    /// One re-encode job per segment with the filter graph burned in
    Reencode,
}

/// One invocation of the external encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeJob {
    pub index: usize,
    pub source_offset_ms: u64,
    pub duration_ms: u64,
    pub filter_graph: Option<String>,
    /// Output file, or the `%03d` pattern for the segment muxer
    pub output_path: PathBuf,
    pub strategy: JobStrategy,
    /// Complete encoder argument vector
    pub args: Vec<String>,
}

/// Jobs for one split plus the strategy chosen for them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSet {
    pub strategy: JobStrategy,
    pub jobs: Vec<EncodeJob>,
}

impl JobSet {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Outcome of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeResult {
    pub index: usize,
    pub status: EncoderStatus,
    pub elapsed_ms: u64,
}

impl EncodeResult {
    pub fn is_success(&self) -> bool {
        self.status == EncoderStatus::Success
    }

    /// Failure of this job as an error, `None` unless the encoder failed
    pub fn to_error(&self) -> Option<SliceError> {
        let EncoderStatus::Failed { code, trace } = &self.status else {
            return None;
        };
        let code = code
            .map(|c| format!("exit code {}", c))
            .unwrap_or_else(|| "no exit code".to_string());
        let trace = trace.trim();
        let message = if trace.is_empty() {
            format!("encoder failed ({})", code)
        } else {
            format!("encoder failed ({}): {}", code, trace)
        };
        Some(SliceError::EncoderFailure {
            index: self.index,
            message,
        })
    }

    /// Diagnostic for a failed job, `None` otherwise
    pub fn error_message(&self) -> Option<String> {
        self.to_error().map(|e| e.to_string())
    }
}
