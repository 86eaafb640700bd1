//! SizeFit CLI
//!
//! Encodes a clip so the output fits a requested file size, using a two-pass
//! encode at a bitrate derived from the size and the clip length.
//!
//! # Usage
//!
//! ```bash
//! sizefit encode --input "video.mkv" --size 8 --start 1:00 --end 1:30 --output clip.webm
//! sizefit bitrate --size 8 --duration 30
//! sizefit timestamp 1:11 11.5
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use sizefit_cli::cli::{commands, Cli, Commands};
use sizefit_cli::config_initialization::initialize_configuration_hierarchy;
use sizefit_cli::utils::logging::{LogLevel, LoggingConfig};
use sizefit_cli::SizeFitError;

/// Exit status for invalid timestamps, durations and sizes
const EXIT_INVALID_INPUT: u8 = 2;

/// Main entry point for the SizeFit CLI application
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            if is_invalid_input(&err) {
                ExitCode::from(EXIT_INVALID_INPUT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&cli)?;

    // Initialize logging
    LoggingConfig {
        level: LogLevel::parse(&config.log_level)?,
        format: cli.log_format,
    }
    .init()?;

    info!("Starting SizeFit CLI");
    debug!(?config, "Effective configuration");

    // Execute the requested command
    match cli.command {
        Commands::Encode(args) => {
            info!("Executing encode command");
            commands::encode(args, &config).await?;
        }
        Commands::Bitrate(args) => {
            info!("Executing bitrate command");
            commands::bitrate(args)?;
        }
        Commands::Timestamp(args) => {
            info!("Executing timestamp command");
            commands::timestamp(args)?;
        }
    }

    info!("SizeFit CLI completed successfully");
    Ok(())
}

fn is_invalid_input(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<SizeFitError>()
            .is_some_and(SizeFitError::is_validation_error)
    })
}
