//! Error handling module for StorySlice

use thiserror::Error;

/// Main error type for StorySlice operations
#[derive(Error, Debug)]
pub enum SliceError {
    /// Invalid split configuration (bad segment length, missing asset, empty selection)
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// External encoder exited with a failure for one job
    #[error("segment {index}: {message}")]
    EncoderFailure { index: usize, message: String },

    /// Output directory could not be created, purged or read
    #[error("Filesystem error at {path}: {message}")]
    Filesystem { path: String, message: String },

    /// A split is already running or awaits acknowledgment of its errors
    #[error("A split is already in progress for this output directory")]
    RunInProgress,

    /// Invalid time format
    #[error("Invalid time format: {time}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds")]
    InvalidTimeFormat { time: String },

    /// Media probe error
    #[error("Failed to probe media file: {message}")]
    Probe { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SliceError {
    /// Shorthand for a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        SliceError::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a filesystem error
    pub fn filesystem(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        SliceError::Filesystem {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Configuration errors are raised before anything runs
    pub fn is_configuration(&self) -> bool {
        matches!(self, SliceError::Configuration { .. })
    }
}

/// Result type alias for StorySlice operations
pub type SliceResult<T> = std::result::Result<T, SliceError>;
