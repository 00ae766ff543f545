//! FFprobe adapter for media file probing

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{SliceError, SliceResult};
use crate::ports::ProbePort;
use crate::utils::time::TimeCode;

/// FFprobe-based probe adapter
#[derive(Debug, Clone)]
pub struct FFprobeAdapter {
    binary: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl Default for FFprobeAdapter {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Extract the container duration from `-of json` output
    pub fn parse_duration(json: &str) -> SliceResult<u64> {
        let output: ProbeOutput = serde_json::from_str(json).map_err(|e| SliceError::Probe {
            message: format!("unreadable ffprobe output: {}", e),
        })?;

        let duration = output
            .format
            .and_then(|format| format.duration)
            .ok_or_else(|| SliceError::Probe {
                message: "ffprobe reported no container duration".to_string(),
            })?;

        duration
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(TimeCode::seconds_to_ms)
            .ok_or_else(|| SliceError::Probe {
                message: format!("invalid duration value '{}'", duration),
            })
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_duration_ms(&self, file_path: &Path) -> SliceResult<u64> {
        debug!("Probing duration of {}", file_path.display());
        let output = Command::new(&self.binary)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(file_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SliceError::Probe {
                message: format!("failed to run {}: {}", self.binary.display(), e),
            })?;

        if !output.status.success() {
            return Err(SliceError::Probe {
                message: format!(
                    "ffprobe failed on {}: {}",
                    file_path.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Self::parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}
