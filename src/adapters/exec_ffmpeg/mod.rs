//! FFmpeg execution adapter
//!
//! Runs one encode job as an `ffmpeg` child process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::engine::cancel::CancelSignal;
use crate::engine::EncodeJob;
use crate::ports::{EncoderExit, EncoderPort, EncoderStatus};

/// Lines of stderr kept as the diagnostic trace of a failed job
const TRACE_LINES: usize = 20;

/// FFmpeg-based execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    binary: PathBuf,
}

impl Default for FFmpegAdapter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn tail(stderr: &str) -> String {
        let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        let skip = lines.len().saturating_sub(TRACE_LINES);
        lines[skip..].join("\n")
    }
}

#[async_trait]
impl EncoderPort for FFmpegAdapter {
    async fn execute(&self, job: &EncodeJob, mut cancel: CancelSignal) -> EncoderExit {
        let started = Instant::now();
        let elapsed_ms = |started: Instant| started.elapsed().as_millis() as u64;

        debug!("Spawning {} for segment {}", self.binary.display(), job.index);
        let spawned = Command::new(&self.binary)
            .args(&job.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                return EncoderExit {
                    status: EncoderStatus::Failed {
                        code: None,
                        trace: format!("failed to start {}: {}", self.binary.display(), e),
                    },
                    elapsed_ms: elapsed_ms(started),
                };
            }
        };

        // Drain stderr concurrently so a chatty encoder never blocks on the pipe
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buffer = String::new();
                if let Err(e) = stderr.read_to_string(&mut buffer).await {
                    warn!("Failed to read encoder stderr: {}", e);
                }
                buffer
            })
        });

        let waited = tokio::select! {
            waited = child.wait() => Some(waited),
            _ = cancel.cancelled() => None,
        };

        let Some(waited) = waited else {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill encoder for segment {}: {}", job.index, e);
            }
            return EncoderExit {
                status: EncoderStatus::Cancelled,
                elapsed_ms: elapsed_ms(started),
            };
        };

        let stderr = match stderr_reader {
            Some(reader) => reader.await.unwrap_or_default(),
            None => String::new(),
        };

        let status = match waited {
            Ok(exit) if exit.success() => EncoderStatus::Success,
            Ok(exit) => EncoderStatus::Failed {
                code: exit.code(),
                trace: Self::tail(&stderr),
            },
            Err(e) => EncoderStatus::Failed {
                code: None,
                trace: format!("failed waiting for encoder: {}", e),
            },
        };

        EncoderExit {
            status,
            elapsed_ms: elapsed_ms(started),
        }
    }
}
