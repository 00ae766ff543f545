//! Command implementations

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::adapters::SlicerConfig;
use crate::app::{AppContainer, SplitOutcome};
use crate::cli::args::{OutputArgs, SplitArgs};
use crate::domain::model::{EditSession, SplitRequest, TransformSpec, VideoAsset};
use crate::engine::CancelHandle;
use crate::output::OutputStager;
use crate::utils::time::TimeCode;
use crate::utils::Utils;

/// Turn split arguments into a request, probing the input when no
/// duration is given
pub async fn build_request(
    container: &dyn AppContainer,
    config: &SlicerConfig,
    args: &SplitArgs,
) -> Result<SplitRequest> {
    let duration_ms = match &args.duration {
        Some(duration) => TimeCode::parse_ms(duration)
            .with_context(|| format!("Invalid duration '{}'", duration))?,
        None => {
            if !args.input.exists() {
                bail!("Input file does not exist: {}", args.input.display());
            }
            container
                .probe()
                .probe_duration_ms(&args.input)
                .await
                .context("Failed to probe input duration")?
        }
    };

    let mut session = EditSession::new();
    session.load_asset(VideoAsset::from_path(&args.input, duration_ms));

    if let Some(start) = &args.start {
        let start_ms =
            TimeCode::parse_ms(start).with_context(|| format!("Invalid start time '{}'", start))?;
        if !session.set_start(start_ms) {
            bail!(
                "Start time {} is past the end of the video ({})",
                start,
                TimeCode::format_arg(duration_ms)
            );
        }
    }
    if let Some(end) = &args.end {
        let end_ms =
            TimeCode::parse_ms(end).with_context(|| format!("Invalid end time '{}'", end))?;
        if end_ms < session.trim().start_ms() {
            bail!("End time {} precedes the start time", end);
        }
        let clamped = session.set_end(end_ms);
        if clamped != end_ms {
            warn!(
                "End time {} is past the end of the video; using {}",
                end,
                TimeCode::format_arg(clamped)
            );
        }
    }

    match &args.segment {
        Some(segment) => session.set_segment_length_input(segment),
        None => session.set_segment_length_secs(config.run.default_segment_secs as f64),
    }
    session.set_transform(TransformSpec::new(args.rotate.into(), args.scale.into()));

    let request = session.split_request().context("Invalid split request")?;
    info!(
        "Selected {} of {} ({} to {})",
        session.selected_duration_label(),
        request.asset.filename,
        TimeCode::format_arg(request.trim.start_ms()),
        TimeCode::format_arg(request.trim.end_ms())
    );
    Ok(request)
}

/// Execute the split command. Returns an error when the run ends with
/// encoder failures that retries did not clear.
pub async fn split(
    container: &dyn AppContainer,
    config: &SlicerConfig,
    args: SplitArgs,
    json: bool,
) -> Result<()> {
    let request = build_request(container, config, &args).await?;

    let (cancel, signal) = CancelHandle::new();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling running encoder jobs");
            cancel.cancel();
        }
    });

    let controller = container.retry_controller();
    let mut outcome = controller
        .submit(request, signal.clone())
        .await
        .context("Split failed")?;

    let mut attempt = 0;
    while !outcome.is_success() && attempt < args.retries && !signal.is_cancelled() {
        attempt += 1;
        warn!(
            "Split ended with {} error(s), retrying ({}/{})",
            outcome.run.errors.len(),
            attempt,
            args.retries
        );
        outcome = controller
            .retry(signal.clone())
            .await
            .context("Retry failed")?;
    }
    interrupt.abort();

    print_outcome(&outcome, json)?;

    if outcome.is_success() {
        Ok(())
    } else {
        let errors = controller.dismiss();
        bail!("Split finished with {} error(s)", errors.len())
    }
}

fn print_outcome(outcome: &SplitOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", outcome.report.to_json()?);
        return Ok(());
    }

    for file in outcome.listing.iter() {
        println!("{}", file);
    }
    for error in &outcome.run.errors {
        eprintln!("error: {}", error);
    }
    info!(
        "{} segment(s) in {}, encoder time {}",
        outcome.listing.len(),
        outcome.report.output_directory,
        Utils::format_elapsed_ms(outcome.run.total_elapsed_ms)
    );
    Ok(())
}

/// Execute the plan command
pub async fn plan(
    container: &dyn AppContainer,
    config: &SlicerConfig,
    args: SplitArgs,
    json: bool,
) -> Result<()> {
    let request = build_request(container, config, &args).await?;
    let prepared = container
        .split_interactor()
        .prepare(&request)
        .context("Failed to plan split")?;

    if json {
        let document = serde_json::json!({
            "plan": prepared.plan,
            "durations_ms": prepared.plan.durations(),
            "jobs": prepared.jobs,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!(
        "{} segment(s), strategy {:?}",
        prepared.plan.segment_count, prepared.jobs.strategy
    );
    for segment in prepared.plan.segments() {
        println!(
            "  #{:03} {} +{}",
            segment.index,
            TimeCode::format_arg(segment.offset_ms),
            TimeCode::format_arg(segment.duration_ms)
        );
    }
    let ffmpeg = config.encoder.ffmpeg_path.display().to_string();
    for job in &prepared.jobs.jobs {
        println!("{} {}", ffmpeg, job.args.join(" "));
    }
    Ok(())
}

fn stager(config: &SlicerConfig, args: &OutputArgs) -> OutputStager {
    let directory = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());
    OutputStager::new(directory, config.job_settings().extension)
}

/// Execute the list command
pub async fn list(config: &SlicerConfig, args: OutputArgs, json: bool) -> Result<()> {
    let listing = stager(config, &args).list().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        for file in listing.iter() {
            println!("{}", file);
        }
    }
    Ok(())
}

/// Execute the clean command
pub async fn clean(config: &SlicerConfig, args: OutputArgs) -> Result<()> {
    let stager = stager(config, &args);
    stager.purge().await;
    info!("Cleaned {}", stager.directory().display());
    Ok(())
}
