// Retry controller - Re-runs the last split after a failure

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::app::split_interactor::{SplitInteractor, SplitOutcome};
use crate::domain::model::SplitRequest;
use crate::engine::CancelSignal;
use crate::error::{SliceError, SliceResult};

/// Remembers the last request so a failed split can be repeated
pub struct RetryController {
    interactor: Arc<SplitInteractor>,
    last_request: Mutex<Option<SplitRequest>>,
}

impl RetryController {
    pub fn new(interactor: Arc<SplitInteractor>) -> Self {
        Self {
            interactor,
            last_request: Mutex::new(None),
        }
    }

    /// Run a split and remember its request
    pub async fn submit(
        &self,
        request: SplitRequest,
        cancel: CancelSignal,
    ) -> SliceResult<SplitOutcome> {
        *self.last_request.lock().await = Some(request.clone());
        self.interactor.request_split(&request, cancel).await
    }

    pub async fn last_request(&self) -> Option<SplitRequest> {
        self.last_request.lock().await.clone()
    }

    /// Errors of the current run
    pub fn errors(&self) -> Vec<String> {
        self.interactor.state().errors
    }

    /// Acknowledge the failed run and repeat the identical request.
    /// The output directory is purged again before encoding.
    pub async fn retry(&self, cancel: CancelSignal) -> SliceResult<SplitOutcome> {
        let request = self
            .last_request()
            .await
            .ok_or_else(|| SliceError::configuration("no previous split to retry"))?;

        let dismissed = self.interactor.acknowledge();
        info!("Retrying split after {} error(s)", dismissed.len());
        self.interactor.request_split(&request, cancel).await
    }

    /// Acknowledge the failed run without repeating it
    pub fn dismiss(&self) -> Vec<String> {
        self.interactor.acknowledge()
    }
}
