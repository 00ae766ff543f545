//! Parallel dispatch of encode jobs and run-state tracking

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::engine::cancel::CancelSignal;
use crate::engine::{EncodeResult, JobSet, JobStrategy};
use crate::error::{SliceError, SliceResult};
use crate::ports::{EncoderPort, EncoderStatus};

/// Lifecycle of one split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    /// Finished with errors; stays here until acknowledged
    Failed,
}

/// Observable state of the current split
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunState {
    pub phase: RunPhase,
    /// True from the start of a run until it completes cleanly or its
    /// errors are acknowledged
    pub running: bool,
    pub total_elapsed_ms: Option<u64>,
    pub errors: Vec<String>,
}

impl RunState {
    fn started() -> Self {
        Self {
            phase: RunPhase::Running,
            running: true,
            total_elapsed_ms: None,
            errors: Vec::new(),
        }
    }

    pub fn awaiting_acknowledgment(&self) -> bool {
        self.phase == RunPhase::Failed
    }
}

/// Joined outcome of every job in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub strategy: JobStrategy,
    /// Per-job results ordered by job index
    pub results: Vec<EncodeResult>,
    /// Sum of the elapsed time of successful jobs
    pub total_elapsed_ms: u64,
    pub errors: Vec<String>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn cancelled_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == EncoderStatus::Cancelled)
            .count()
    }
}

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Upper bound on concurrently running encoder processes
    pub max_parallel_jobs: usize,
    /// Pause between reaching a clean terminal state and clearing `running`
    pub settle_delay: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_parallel_jobs: num_cpus::get(),
            settle_delay: Duration::from_millis(1000),
        }
    }
}

/// Dispatches job sets to the encoder, one run at a time
pub struct EncodeOrchestrator {
    encoder: Arc<dyn EncoderPort>,
    state: watch::Sender<RunState>,
    settings: OrchestratorSettings,
}

impl EncodeOrchestrator {
    /// Create a new orchestrator over an encoder port
    pub fn new(encoder: Arc<dyn EncoderPort>, settings: OrchestratorSettings) -> Self {
        let (state, _) = watch::channel(RunState::default());
        let settings = OrchestratorSettings {
            max_parallel_jobs: settings.max_parallel_jobs.max(1),
            ..settings
        };
        Self {
            encoder,
            state,
            settings,
        }
    }

    /// Snapshot of the current run state
    pub fn state(&self) -> RunState {
        self.state.borrow().clone()
    }

    /// Stream of run-state transitions
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Claim the orchestrator for a new run and reset its state.
    ///
    /// Rejected while another run is in flight or its errors are still
    /// unacknowledged, since a new run would purge the shared output
    /// directory under it.
    pub fn begin(&self) -> SliceResult<()> {
        let claimed = self.state.send_if_modified(|state| {
            if state.running {
                return false;
            }
            *state = RunState::started();
            true
        });

        if claimed {
            info!("Run started");
            Ok(())
        } else {
            warn!("Rejected split request: a run is already in progress");
            Err(SliceError::RunInProgress)
        }
    }

    /// Claim the orchestrator and execute a job set
    pub async fn run(&self, job_set: &JobSet, cancel: CancelSignal) -> SliceResult<RunResult> {
        self.begin()?;
        Ok(self.execute(job_set, cancel).await)
    }

    /// Execute a job set inside a run claimed with [`begin`](Self::begin).
    ///
    /// Every job is dispatched and joined; a failing job never stops its
    /// siblings.
    pub async fn execute(&self, job_set: &JobSet, cancel: CancelSignal) -> RunResult {
        info!(
            "Dispatching {} {:?} job(s), up to {} at a time",
            job_set.len(),
            job_set.strategy,
            self.settings.max_parallel_jobs
        );

        let results = self.fan_out(job_set, cancel).await;
        let run = Self::reduce(job_set.strategy, results);

        if run.is_success() {
            info!(
                "Run completed: {} job(s) in {}ms of encoder time",
                run.results.len(),
                run.total_elapsed_ms
            );
            self.complete(run.total_elapsed_ms).await;
        } else {
            error!("Run finished with {} failed job(s)", run.errors.len());
            self.state.send_modify(|state| {
                state.phase = RunPhase::Failed;
                state.running = true;
                state.total_elapsed_ms = Some(run.total_elapsed_ms);
                state.errors = run.errors.clone();
            });
        }
        run
    }

    /// Mark a claimed run as failed before any job ran
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        error!("Run failed: {}", message);
        self.state.send_modify(|state| {
            state.phase = RunPhase::Failed;
            state.running = true;
            state.errors.push(message);
        });
    }

    /// Dismiss a failed run's errors so a new run can start.
    /// Returns the acknowledged errors.
    pub fn acknowledge(&self) -> Vec<String> {
        let mut acknowledged = Vec::new();
        self.state.send_if_modified(|state| {
            if state.phase != RunPhase::Failed {
                return false;
            }
            acknowledged = std::mem::take(&mut state.errors);
            *state = RunState::default();
            true
        });
        if !acknowledged.is_empty() {
            info!("Acknowledged {} run error(s)", acknowledged.len());
        }
        acknowledged
    }

    async fn fan_out(&self, job_set: &JobSet, cancel: CancelSignal) -> Vec<EncodeResult> {
        let permits = Arc::new(Semaphore::new(self.settings.max_parallel_jobs));
        let mut workers = JoinSet::new();

        for job in job_set.jobs.iter().cloned() {
            let encoder = Arc::clone(&self.encoder);
            let permits = Arc::clone(&permits);
            let cancel = cancel.clone();

            workers.spawn(async move {
                let _permit = permits.acquire_owned().await;
                if cancel.is_cancelled() {
                    return EncodeResult {
                        index: job.index,
                        status: EncoderStatus::Cancelled,
                        elapsed_ms: 0,
                    };
                }
                let exit = encoder.execute(&job, cancel).await;
                // A killed or failed re-encode leaves a truncated segment behind
                if job.strategy == JobStrategy::Reencode && exit.status != EncoderStatus::Success {
                    Self::discard_partial(&job.output_path).await;
                }
                EncodeResult {
                    index: job.index,
                    status: exit.status,
                    elapsed_ms: exit.elapsed_ms,
                }
            });
        }

        let mut results = Vec::with_capacity(job_set.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(result) => {
                    Self::log_result(&result);
                    results.push(result);
                }
                Err(e) => error!("Encoder worker aborted: {}", e),
            }
        }

        // A panicked worker leaves no result; report its job as failed
        let reported: BTreeSet<usize> = results.iter().map(|r| r.index).collect();
        for job in &job_set.jobs {
            if !reported.contains(&job.index) {
                results.push(EncodeResult {
                    index: job.index,
                    status: EncoderStatus::Failed {
                        code: None,
                        trace: "encoder worker aborted".to_string(),
                    },
                    elapsed_ms: 0,
                });
            }
        }

        results.sort_by_key(|r| r.index);
        results
    }

    /// Remove whatever an unfinished re-encode left at its output path
    async fn discard_partial(path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => warn!("Removed partial output {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove partial output {}: {}", path.display(), e),
        }
    }

    fn log_result(result: &EncodeResult) {
        match &result.status {
            EncoderStatus::Success => {
                info!(
                    "Encode of segment {} completed successfully in {} milliseconds",
                    result.index, result.elapsed_ms
                );
            }
            EncoderStatus::Cancelled => info!("Encode of segment {} cancelled", result.index),
            EncoderStatus::Failed { code, trace } => {
                error!(
                    "Encode of segment {} failed with code {:?}: {}",
                    result.index,
                    code,
                    trace.trim()
                );
            }
        }
    }

    fn reduce(strategy: JobStrategy, results: Vec<EncodeResult>) -> RunResult {
        let total_elapsed_ms = results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.elapsed_ms)
            .sum();
        let errors = results.iter().filter_map(EncodeResult::error_message).collect();

        RunResult {
            strategy,
            results,
            total_elapsed_ms,
            errors,
        }
    }

    async fn complete(&self, total_elapsed_ms: u64) {
        self.state.send_modify(|state| {
            state.total_elapsed_ms = Some(total_elapsed_ms);
        });
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }
        self.state.send_modify(|state| {
            state.phase = RunPhase::Completed;
            state.running = false;
        });
    }
}
