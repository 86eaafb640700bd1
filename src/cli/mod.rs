//! CLI module for SizeFit
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

/// SizeFit CLI
///
/// Encodes a clip with a two-pass bitrate budget so the output lands at or
/// under a requested file size.
#[derive(Parser, Debug)]
#[command(name = "sizefit")]
#[command(about = "SizeFit - size-targeted two-pass video encoding")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SIZEFIT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Configuration file (default: ./sizefit.toml or the user config directory)
    #[arg(long, global = true, env = "SIZEFIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Encoder binary (default: ffmpeg on PATH)
    #[arg(long, global = true, env = "SIZEFIT_ENCODER")]
    pub encoder: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a clip to fit a target size
    Encode(args::EncodeArgs),
    /// Print the bitrate budget for a size and duration
    Bitrate(args::BitrateArgs),
    /// Normalize timestamps and show their value in seconds
    Timestamp(args::TimestampArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encode_with_trailing_base_args() {
        let cli = Cli::try_parse_from([
            "sizefit", "encode", "-i", "in.mkv", "--size", "8", "-s", "1:00", "-e", "1:30", "-o",
            "out.webm", "--", "-c:v", "libvpx-vp9",
        ])
        .unwrap();
        match cli.command {
            Commands::Encode(args) => {
                assert_eq!(args.size, 8.0);
                assert_eq!(args.base_args, ["-c:v", "libvpx-vp9"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn bitrate_accepts_negative_size_for_validation() {
        let cli = Cli::try_parse_from(["sizefit", "bitrate", "--size", "-5", "--duration", "60"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Bitrate(ref a) if a.size == -5.0));
    }

    #[test]
    fn bitrate_needs_duration_or_end() {
        assert!(Cli::try_parse_from(["sizefit", "bitrate", "--size", "5"]).is_err());
    }
}
