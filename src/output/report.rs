//! Machine-readable summary of a finished split

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::SplitRequest;
use crate::engine::{JobStrategy, RunPhase, RunResult};
use crate::error::{SliceError, SliceResult};
use crate::output::OutputListing;
use crate::utils::time::TimeCode;

/// Summary of one run, printed by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub input: String,
    pub output_directory: String,
    pub strategy: JobStrategy,
    pub phase: RunPhase,
    pub selection_start: String,
    pub selection_end: String,
    pub segment_length_secs: String,
    pub jobs: usize,
    pub cancelled_jobs: usize,
    /// Encoder time summed over successful jobs
    pub total_elapsed_ms: u64,
    pub errors: Vec<String>,
    pub files: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn new(
        request: &SplitRequest,
        output_directory: &str,
        run: &RunResult,
        phase: RunPhase,
        listing: &OutputListing,
    ) -> Self {
        Self {
            input: request.asset.uri.display().to_string(),
            output_directory: output_directory.to_string(),
            strategy: run.strategy,
            phase,
            selection_start: TimeCode::format_arg(request.trim.start_ms()),
            selection_end: TimeCode::format_arg(request.trim.end_ms()),
            segment_length_secs: TimeCode::format_seconds(request.segment_length_ms),
            jobs: run.results.len(),
            cancelled_jobs: run.cancelled_count(),
            total_elapsed_ms: run.total_elapsed_ms,
            errors: run.errors.clone(),
            files: listing.files.clone(),
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json(&self) -> SliceResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SliceError::Io(e.into()))
    }
}
