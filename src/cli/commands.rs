//! Command implementations

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::{AppContainer, DefaultAppContainer, EncodeRequest};
use crate::cli::args::{BitrateArgs, EncodeArgs, TimestampArgs};
use crate::domain::model::{ClipRange, EncodeReport};
use crate::error::SizeFitError;
use crate::planner::BitratePlanner;
use crate::utils::time::TimeParser;
use crate::utils::Utils;

/// Execute the encode command
pub async fn encode(args: EncodeArgs, config: &AppConfig) -> Result<()> {
    info!("Starting encode operation");
    info!("Input: {}", args.input);
    info!("Output: {}", args.output.display());

    let base_args = if args.base_args.is_empty() {
        config.base_args.clone()
    } else {
        args.base_args
    };

    let request = EncodeRequest {
        input: args.input,
        size_mb: args.size,
        start: args.start,
        end: args.end,
        output: args.output,
        base_args,
    };

    // Everything that can be rejected up front is rejected before the encoder is even looked up.
    let command = request.prepare()?;

    let container = DefaultAppContainer::new(config)?;
    let interactor = container.encode_interactor();

    let report = tokio::select! {
        result = interactor.encode(&command) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, terminating encoder");
            return Err(SizeFitError::Cancelled.into());
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize encode report to JSON")?;
        println!("{}", json);
    } else {
        display_report(&report);
    }

    report.into_result()?;
    info!("Encode operation completed successfully");
    Ok(())
}

/// Execute the bitrate command
pub fn bitrate(args: BitrateArgs) -> Result<()> {
    let parser = TimeParser::new();
    let duration = match (&args.duration, &args.end) {
        (Some(duration), _) => parser.parse_duration(duration)?,
        (None, Some(end)) => ClipRange::from_timestamps(&args.start, end)?.duration_seconds(),
        (None, None) => anyhow::bail!("either --duration or --end is required"),
    };

    let bitrate = BitratePlanner::new().plan_bitrate(args.size, duration)?;
    info!(duration_seconds = duration, "Planned {}", bitrate);
    println!("{}", bitrate.kbps);
    Ok(())
}

/// Execute the timestamp command
pub fn timestamp(args: TimestampArgs) -> Result<()> {
    let parser = TimeParser::new();
    for input in &args.timestamps {
        let seconds = parser
            .parse_duration(input)
            .with_context(|| format!("Cannot convert '{}'", input))?;
        println!("{}\t{}", parser.normalize_timestamp(input), seconds);
    }
    Ok(())
}

fn display_report(report: &EncodeReport) {
    println!("Output:  {}", report.output_path.display());
    println!("Bitrate: {}", report.bitrate);
    println!(
        "Pass 1:  {}",
        describe_exit(report.pass1.success, report.pass1.exit_code)
    );
    println!(
        "Pass 2:  {}",
        describe_exit(report.pass2.success, report.pass2.exit_code)
    );
    if let Some(size) = report.output_size {
        let budget = match size.within_budget {
            Some(true) => " (within target)",
            Some(false) => " (over target)",
            None => "",
        };
        println!(
            "Size:    {}{}",
            Utils::format_file_size((size.kilobytes * 1024.0) as u64),
            budget
        );
    }
    if report.pass1_degraded() {
        println!("Warning: pass 1 failed; pass 2 ran without complete statistics");
    }
}

fn describe_exit(success: bool, code: Option<i32>) -> String {
    match (success, code) {
        (true, _) => "ok".to_string(),
        (false, Some(code)) => format!("failed (exit code {})", code),
        (false, None) => "failed (terminated by signal)".to_string(),
    }
}
