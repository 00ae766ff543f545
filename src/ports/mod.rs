// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::cancel::CancelSignal;
use crate::engine::EncodeJob;
use crate::error::SliceResult;

/// Terminal status of one encoder invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncoderStatus {
    /// Exited with status zero
    Success,
    /// Stopped by a cancellation request
    Cancelled,
    /// Non-zero exit, or the process could not be started
    Failed { code: Option<i32>, trace: String },
}

/// What the orchestrator observes from one encoder invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderExit {
    pub status: EncoderStatus,
    pub elapsed_ms: u64,
}

/// Port for the external encoder
#[async_trait]
pub trait EncoderPort: Send + Sync {
    /// Run one job to a terminal state. Never returns early on failure;
    /// every problem is reported through [`EncoderStatus::Failed`].
    async fn execute(&self, job: &EncodeJob, cancel: CancelSignal) -> EncoderExit;
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of the media file in milliseconds
    async fn probe_duration_ms(&self, file_path: &Path) -> SliceResult<u64>;
}
