// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::DEFAULT_SEGMENT_SECS;
use crate::engine::orchestrator::OrchestratorSettings;
use crate::engine::JobSettings;
use crate::error::{SliceError, SliceResult};

/// Config files probed when no `--config` is given, in order
pub const CONFIG_SEARCH_PATHS: &[&str] = &["storyslice.toml", "config/storyslice.toml"];

/// Highest Constant Rate Factor accepted by x264/x265
pub const MAX_CRF: u8 = 51;

/// Complete slicer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerConfig {
    pub encoder: EncoderSection,
    pub output: OutputSection,
    pub run: RunSection,
    pub logging: LoggingSection,
}

/// External encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSection {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub video_codec: String,
    pub crf: u8,
    pub gop: u32,
}

impl Default for EncoderSection {
    fn default() -> Self {
        let jobs = JobSettings::default();
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            video_codec: jobs.video_codec,
            crf: jobs.crf,
            gop: jobs.gop,
        }
    }
}

/// Output directory settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub directory: PathBuf,
    pub extension: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        let jobs = JobSettings::default();
        Self {
            directory: jobs.output_dir,
            extension: jobs.extension,
        }
    }
}

/// Run scheduling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// 0 means one job per CPU
    pub max_parallel_jobs: usize,
    pub settle_delay_ms: u64,
    pub default_segment_secs: u64,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            max_parallel_jobs: 0,
            settle_delay_ms: 1000,
            default_segment_secs: DEFAULT_SEGMENT_SECS,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SlicerConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> SliceResult<Self> {
        toml::from_str(content)
            .map_err(|e| SliceError::configuration(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load and parse a config file
    pub fn load(path: &Path) -> SliceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SliceError::configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the explicit config file, else the first file found on the
    /// search path, else the defaults. Returns the file used, if any.
    pub fn discover(explicit: Option<&Path>) -> SliceResult<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        for candidate in CONFIG_SEARCH_PATHS {
            let path = Path::new(candidate);
            if path.is_file() {
                return Ok((Self::load(path)?, Some(path.to_path_buf())));
            }
        }

        debug!("No config file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Apply `SLICER_*` overrides read through `lookup`. Returns the number
    /// of overrides applied.
    pub fn apply_env<F>(&mut self, lookup: F) -> SliceResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;

        if let Some(level) = lookup("SLICER_LOG_LEVEL") {
            self.logging.level = level;
            applied += 1;
        }
        if let Some(path) = lookup("SLICER_FFMPEG") {
            self.encoder.ffmpeg_path = PathBuf::from(path);
            applied += 1;
        }
        if let Some(path) = lookup("SLICER_FFPROBE") {
            self.encoder.ffprobe_path = PathBuf::from(path);
            applied += 1;
        }
        if let Some(dir) = lookup("SLICER_OUTPUT_DIR") {
            self.output.directory = PathBuf::from(dir);
            applied += 1;
        }
        if let Some(jobs) = lookup("SLICER_MAX_JOBS") {
            self.run.max_parallel_jobs = Self::parse_env("SLICER_MAX_JOBS", &jobs)?;
            applied += 1;
        }
        if let Some(crf) = lookup("SLICER_CRF") {
            self.encoder.crf = Self::parse_env("SLICER_CRF", &crf)?;
            applied += 1;
        }

        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }
        Ok(applied)
    }

    fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> SliceResult<T> {
        value.trim().parse().map_err(|_| {
            SliceError::configuration(format!("{} has an invalid value '{}'", name, value))
        })
    }

    /// Reject values no run could use
    pub fn validate(&self) -> SliceResult<()> {
        if self.encoder.crf > MAX_CRF {
            return Err(SliceError::configuration(format!(
                "crf must be between 0 and {}, got {}",
                MAX_CRF, self.encoder.crf
            )));
        }
        if self.encoder.video_codec.trim().is_empty() {
            return Err(SliceError::configuration("video codec must not be empty"));
        }
        if self.output.extension.trim_start_matches('.').is_empty() {
            return Err(SliceError::configuration("output extension must not be empty"));
        }
        if self.run.default_segment_secs == 0 {
            return Err(SliceError::configuration(
                "default segment length must be greater than zero",
            ));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(SliceError::configuration(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Settings handed to the job builder
    pub fn job_settings(&self) -> JobSettings {
        JobSettings {
            output_dir: self.output.directory.clone(),
            extension: self.output.extension.trim_start_matches('.').to_string(),
            video_codec: self.encoder.video_codec.clone(),
            crf: self.encoder.crf,
            gop: self.encoder.gop,
        }
    }

    /// Settings handed to the orchestrator
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        let max_parallel_jobs = match self.run.max_parallel_jobs {
            0 => num_cpus::get(),
            n => n,
        };
        OrchestratorSettings {
            max_parallel_jobs,
            settle_delay: Duration::from_millis(self.run.settle_delay_ms),
        }
    }

    pub fn default_segment_ms(&self) -> u64 {
        self.run.default_segment_secs * 1_000
    }
}
