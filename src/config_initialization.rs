//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::adapters::SlicerConfig;
use crate::cli::{Cli, Commands};

/// Resolved configuration and the file it came from
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: SlicerConfig,
    pub source: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

/// Resolve configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> Result<ResolvedConfig> {
    initialize_configuration_with(cli, |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration`] with an explicit environment lookup
pub fn initialize_configuration_with<F>(cli: &Cli, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1 and 2: defaults, then the config file
    let (mut config, source) =
        SlicerConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;

    // Step 3: environment variables
    let env_overrides = config
        .apply_env(env)
        .context("Invalid environment configuration")?;

    // Step 4: command-line arguments
    let cli_overrides = apply_cli_overrides(&mut config, cli);

    config.validate().context("Invalid configuration")?;

    Ok(ResolvedConfig {
        config,
        source,
        env_overrides,
        cli_overrides,
    })
}

fn apply_cli_overrides(config: &mut SlicerConfig, cli: &Cli) -> usize {
    let mut applied = 0;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
        applied += 1;
    }
    if cli.json {
        config.logging.json = true;
        applied += 1;
    }
    if let Some(dir) = cli.command.output_dir() {
        config.output.directory = dir.clone();
        applied += 1;
    }

    if let Commands::Split(args) | Commands::Plan(args) = &cli.command {
        if let Some(crf) = args.crf {
            config.encoder.crf = crf;
            applied += 1;
        }
        if let Some(jobs) = args.jobs {
            config.run.max_parallel_jobs = jobs;
            applied += 1;
        }
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("slicer").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("slicer.toml");
        std::fs::write(
            &path,
            "[encoder]\ncrf = 20\n[output]\ndirectory = \"file-dir\"\n[run]\nmax_parallel_jobs = 8\n",
        )
        .unwrap();
        let config_arg = path.display().to_string();

        let cli = cli(&[
            "--config",
            &config_arg,
            "split",
            "--input",
            "video.mp4",
            "--crf",
            "35",
        ]);
        let resolved = initialize_configuration_with(&cli, |key| match key {
            "SLICER_CRF" => Some("30".to_string()),
            "SLICER_OUTPUT_DIR" => Some("env-dir".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(resolved.source, Some(path));
        assert_eq!(resolved.config.encoder.crf, 35);
        assert_eq!(resolved.config.output.directory, PathBuf::from("env-dir"));
        assert_eq!(resolved.config.run.max_parallel_jobs, 8);
        assert_eq!(resolved.env_overrides, 2);
        assert_eq!(resolved.cli_overrides, 1);
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let cli = cli(&["--log-level", "chatty", "list"]);
        assert!(initialize_configuration_with(&cli, |_| None).is_err());
    }
}
