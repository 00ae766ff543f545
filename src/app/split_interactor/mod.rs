// Split interactor - Orchestrates the split use case

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::model::SplitRequest;
use crate::engine::orchestrator::OrchestratorSettings;
use crate::engine::{
    CancelSignal, EncodeOrchestrator, JobBuilder, JobSet, JobSettings, RunResult, RunState,
};
use crate::error::SliceResult;
use crate::output::{OutputListing, OutputStager, RunReport};
use crate::planner::{SegmentPlan, SegmentPlanner, TransformResolver};
use crate::ports::EncoderPort;

/// Plan and jobs for a request, before anything runs
#[derive(Debug, Clone)]
pub struct PreparedSplit {
    pub plan: SegmentPlan,
    pub jobs: JobSet,
}

/// Everything a finished split produced
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub run: RunResult,
    pub state: RunState,
    pub listing: OutputListing,
    pub report: RunReport,
}

impl SplitOutcome {
    pub fn is_success(&self) -> bool {
        self.run.is_success()
    }
}

/// Interactor for the split use case
pub struct SplitInteractor {
    builder: JobBuilder,
    stager: OutputStager,
    orchestrator: EncodeOrchestrator,
}

impl SplitInteractor {
    /// Create new split interactor with an injected encoder port
    pub fn new(
        encoder: Arc<dyn EncoderPort>,
        job_settings: JobSettings,
        orchestrator_settings: OrchestratorSettings,
    ) -> Self {
        let stager = OutputStager::new(&job_settings.output_dir, &job_settings.extension);
        Self {
            builder: JobBuilder::new(job_settings),
            stager,
            orchestrator: EncodeOrchestrator::new(encoder, orchestrator_settings),
        }
    }

    pub fn stager(&self) -> &OutputStager {
        &self.stager
    }

    pub fn state(&self) -> RunState {
        self.orchestrator.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.orchestrator.subscribe()
    }

    /// Dismiss the errors of a failed run
    pub fn acknowledge(&self) -> Vec<String> {
        self.orchestrator.acknowledge()
    }

    /// Plan segments, resolve the filter graph and build every job
    pub fn prepare(&self, request: &SplitRequest) -> SliceResult<PreparedSplit> {
        let plan = SegmentPlanner::plan(&request.trim, request.segment_length_ms)?;
        let transform = TransformResolver::resolve(&request.transform);
        let jobs = self.builder.build(&request.asset, &plan, &transform)?;
        Ok(PreparedSplit { plan, jobs })
    }

    /// Run a split: purge, stage, encode, then list the outputs.
    ///
    /// Configuration problems are reported before the output directory is
    /// touched. Encoder failures do not fail the call; they are returned in
    /// the outcome and hold the run open until acknowledged.
    pub async fn request_split(
        &self,
        request: &SplitRequest,
        cancel: CancelSignal,
    ) -> SliceResult<SplitOutcome> {
        let prepared = self.prepare(request)?;
        info!(
            "Splitting {} into {} segment(s) of {}ms",
            request.asset.filename, prepared.plan.segment_count, prepared.plan.segment_length_ms
        );

        self.orchestrator.begin()?;

        self.stager.purge().await;
        if let Err(e) = self.stager.ensure_directory().await {
            self.orchestrator.fail(e.to_string());
            return Err(e);
        }

        let run = self.orchestrator.execute(&prepared.jobs, cancel).await;
        let listing = self.stager.list().await;
        let state = self.orchestrator.state();

        if run.is_success() && listing.len() != prepared.plan.segment_count {
            warn!(
                "Expected {} segment(s) but found {} in {}",
                prepared.plan.segment_count,
                listing.len(),
                self.stager.directory().display()
            );
        }

        let report = RunReport::new(
            request,
            &self.stager.directory().display().to_string(),
            &run,
            state.phase,
            &listing,
        );

        Ok(SplitOutcome {
            run,
            state,
            listing,
            report,
        })
    }
}
