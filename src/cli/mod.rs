//! CLI module for StorySlice
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// StorySlice video splitter
///
/// Cuts a trimmed selection of a video into fixed-length story segments,
/// stream-copying when possible and re-encoding when rotated or scaled.
#[derive(Parser, Debug)]
#[command(name = "slicer")]
#[command(about = "StorySlice - Split videos into fixed-length story segments")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (overrides config and SLICER_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Configuration file (default: storyslice.toml, then config/storyslice.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit JSON logs and JSON reports
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a video into segments
    Split(args::SplitArgs),
    /// Show the segment plan and encoder arguments without running anything
    Plan(args::SplitArgs),
    /// List the segments in the output directory
    List(args::OutputArgs),
    /// Delete the output directory
    Clean(args::OutputArgs),
}

impl Commands {
    /// Output directory given on the command line, if any
    pub fn output_dir(&self) -> Option<&PathBuf> {
        match self {
            Commands::Split(args) | Commands::Plan(args) => args.output.output_dir.as_ref(),
            Commands::List(args) | Commands::Clean(args) => args.output_dir.as_ref(),
        }
    }
}
