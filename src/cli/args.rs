//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the encode command
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Target output size in megabytes
    #[arg(long, allow_negative_numbers = true)]
    pub size: f64,

    /// Clip start (SS, MM:SS or HH:MM:SS, optional .fraction)
    #[arg(short, long, default_value = "0")]
    pub start: String,

    /// Clip end (SS, MM:SS or HH:MM:SS, optional .fraction)
    #[arg(short, long)]
    pub end: String,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Print the encode report as JSON
    #[arg(long)]
    pub json: bool,

    /// Base encoder arguments, replacing the configured template
    #[arg(last = true)]
    pub base_args: Vec<String>,
}

/// Arguments for the bitrate command
#[derive(Args, Debug)]
pub struct BitrateArgs {
    /// Target output size in megabytes
    #[arg(long, allow_negative_numbers = true)]
    pub size: f64,

    /// Clip length (SS, MM:SS or HH:MM:SS)
    #[arg(short, long, required_unless_present = "end", conflicts_with = "end")]
    pub duration: Option<String>,

    /// Clip start, used with --end
    #[arg(short, long, default_value = "0")]
    pub start: String,

    /// Clip end, used with --start
    #[arg(short, long)]
    pub end: Option<String>,
}

/// Arguments for the timestamp command
#[derive(Args, Debug)]
pub struct TimestampArgs {
    /// Timestamps to normalize
    #[arg(required = true)]
    pub timestamps: Vec<String>,
}
