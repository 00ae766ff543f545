//! StorySlice Library
//!
//! Splits a trimmed selection of a video into fixed-length segments by
//! driving an external `ffmpeg`, stream-copying when no transform is
//! requested and re-encoding each segment in parallel otherwise.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{
    EditSession, Rotation, Scale, SplitRequest, TransformSpec, TrimRange, VideoAsset,
};
pub use engine::{CancelHandle, CancelSignal, EncodeOrchestrator, RunPhase, RunState};
pub use error::{SliceError, SliceResult};
