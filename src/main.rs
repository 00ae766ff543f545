//! StorySlice CLI
//!
//! Splits a video into fixed-length segments for story-style uploads.
//!
//! # Usage
//!
//! ```bash
//! slicer split --input video.mp4 --segment 30
//! slicer split --input video.mp4 --start 00:01:00 --end 00:03:00 --rotate 90 --scale 720
//! slicer plan --input video.mp4 --duration 125
//! slicer list
//! slicer clean
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use storyslice_cli::adapters::init_logging;
use storyslice_cli::app::DefaultAppContainer;
use storyslice_cli::cli::{commands, Cli, Commands};
use storyslice_cli::config_initialization::initialize_configuration;

/// Main entry point for the StorySlice CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = initialize_configuration(&cli)?;
    let config = resolved.config;
    init_logging(&config.logging.level, config.logging.json)?;

    match &resolved.source {
        Some(path) => info!("Using configuration from {}", path.display()),
        None => debug!("Using default configuration"),
    }
    debug!(
        "{} environment and {} command-line overrides applied",
        resolved.env_overrides, resolved.cli_overrides
    );

    let container = DefaultAppContainer::new(&config);
    let json = config.logging.json;

    match cli.command {
        Commands::Split(args) => {
            info!("Executing split command");
            commands::split(&container, &config, args, json).await?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(&container, &config, args, json).await?;
        }
        Commands::List(args) => commands::list(&config, args, json).await?,
        Commands::Clean(args) => commands::clean(&config, args).await?,
    }

    Ok(())
}
