//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::adapters::toml_config::MAX_CRF;
use crate::domain::model::{Rotation, Scale};

fn crf_in_range(s: &str) -> Result<u8, String> {
    clap_num::number_range(s, 0, MAX_CRF)
}

/// Rotation choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RotateArg {
    #[default]
    None,
    #[value(name = "90")]
    Cw90,
    #[value(name = "-90")]
    Ccw90,
    #[value(name = "180")]
    Half,
}

impl From<RotateArg> for Rotation {
    fn from(arg: RotateArg) -> Self {
        match arg {
            RotateArg::None => Rotation::None,
            RotateArg::Cw90 => Rotation::Cw90,
            RotateArg::Ccw90 => Rotation::Ccw90,
            RotateArg::Half => Rotation::Half,
        }
    }
}

/// Scale choices, by output height or width in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScaleArg {
    #[default]
    Native,
    #[value(name = "144")]
    P144,
    #[value(name = "360")]
    P360,
    #[value(name = "720")]
    P720,
    #[value(name = "1080")]
    P1080,
}

impl From<ScaleArg> for Scale {
    fn from(arg: ScaleArg) -> Self {
        match arg {
            ScaleArg::Native => Scale::Native,
            ScaleArg::P144 => Scale::P144,
            ScaleArg::P360 => Scale::P360,
            ScaleArg::P720 => Scale::P720,
            ScaleArg::P1080 => Scale::P1080,
        }
    }
}

/// Output directory selection shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output directory (overrides config and SLICER_OUTPUT_DIR)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the split and plan commands
#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Selection start (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub start: Option<String>,

    /// Selection end (HH:MM:SS.ms, MM:SS.ms, or seconds; default: end of video)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Duration of the input video; probed with ffprobe when omitted
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Segment length in seconds (default from config, 30)
    #[arg(long)]
    pub segment: Option<String>,

    /// Rotation in degrees
    #[arg(long, value_enum, default_value_t = RotateArg::None, allow_hyphen_values = true)]
    pub rotate: RotateArg,

    /// Scale preset
    #[arg(long, value_enum, default_value_t = ScaleArg::Native)]
    pub scale: ScaleArg,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Constant Rate Factor for re-encoded segments (0-51)
    #[arg(long, value_parser = crf_in_range)]
    pub crf: Option<u8>,

    /// Maximum concurrent encoder processes
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Times to repeat a split that ended with errors
    #[arg(long, default_value_t = 0)]
    pub retries: u32,
}
