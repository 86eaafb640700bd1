// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{SizeFitError, SizeFitResult};
use crate::planner::{Bitrate, SizeTarget};
use crate::utils::time::{CanonicalTimestamp, TimeParser};

/// Clip boundaries as entered by the user, with their whole-second values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipRange {
    pub start: CanonicalTimestamp,
    pub end: CanonicalTimestamp,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl ClipRange {
    /// Parse both timestamps. The range must have a positive duration.
    pub fn from_timestamps(start: &str, end: &str) -> SizeFitResult<Self> {
        let parser = TimeParser::new();
        let start_seconds = parser.parse_duration(start)?;
        let end_seconds = parser.parse_duration(end)?;

        let duration = end_seconds - start_seconds;
        if duration <= 0.0 {
            return Err(SizeFitError::InvalidDuration { seconds: duration });
        }

        Ok(Self {
            start: parser.normalize_timestamp(start),
            end: parser.normalize_timestamp(end),
            start_seconds,
            end_seconds,
        })
    }

    /// Clip length in whole seconds
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Everything one encode request needs. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeCommand {
    base_args: Vec<String>,
    output_path: PathBuf,
    bitrate: Bitrate,
    target: Option<SizeTarget>,
}

impl EncodeCommand {
    pub fn new(
        base_args: Vec<String>,
        output_path: impl Into<PathBuf>,
        bitrate: Bitrate,
    ) -> SizeFitResult<Self> {
        let output_path = output_path.into();
        if output_path.as_os_str().is_empty() {
            return Err(SizeFitError::config("output path cannot be empty"));
        }

        Ok(Self {
            base_args,
            output_path,
            bitrate,
            target: None,
        })
    }

    /// Remember the size target so the finished artifact can be checked against it
    pub fn with_target(mut self, target: SizeTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn base_args(&self) -> &[String] {
        &self.base_args
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn bitrate(&self) -> Bitrate {
        self.bitrate
    }

    pub fn target(&self) -> Option<SizeTarget> {
        self.target
    }
}

/// Which of the two encoder passes an invocation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassIndex {
    First,
    Second,
}

impl PassIndex {
    /// Value for the encoder's `-pass` flag
    pub fn number(&self) -> u8 {
        match self {
            PassIndex::First => 1,
            PassIndex::Second => 2,
        }
    }
}

impl fmt::Display for PassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass {}", self.number())
    }
}

/// A fully built encoder process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassInvocation {
    pub pass: PassIndex,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

/// Exit status and captured output of one encoder pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassResult {
    pub pass: PassIndex,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl PassResult {
    pub fn succeeded(pass: PassIndex) -> Self {
        Self {
            pass,
            exit_code: Some(0),
            success: true,
            stdout: None,
            stderr: None,
        }
    }

    pub fn failed(pass: PassIndex, exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        Self {
            pass,
            exit_code,
            success: false,
            stdout: None,
            stderr: (!stderr.is_empty()).then_some(stderr),
        }
    }

    /// Last `lines` lines of stderr joined with `"; "`
    pub fn stderr_tail(&self, lines: usize) -> String {
        let Some(stderr) = self.stderr.as_deref() else {
            return String::new();
        };
        let mut tail: Vec<&str> = stderr
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .take(lines)
            .collect();
        tail.reverse();
        tail.join("; ")
    }
}

/// Final verdict of an encode request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeOutcome {
    Succeeded,
    Failed,
}

/// Lifecycle of one encode request: `Idle -> Pass1Running -> Pass2Running -> Succeeded | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeState {
    Idle,
    Pass1Running,
    Pass2Running,
    Succeeded,
    Failed,
}

impl EncodeState {
    pub fn can_transition_to(&self, next: EncodeState) -> bool {
        matches!(
            (self, next),
            (EncodeState::Idle, EncodeState::Pass1Running)
                | (EncodeState::Idle, EncodeState::Failed)
                | (EncodeState::Pass1Running, EncodeState::Pass2Running)
                | (EncodeState::Pass1Running, EncodeState::Failed)
                | (EncodeState::Pass2Running, EncodeState::Succeeded)
                | (EncodeState::Pass2Running, EncodeState::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EncodeState::Succeeded | EncodeState::Failed)
    }
}

/// Output artifact measurement, only present after a successful pass 2
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputSize {
    pub kilobytes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_budget: Option<bool>,
}

/// What an encode request produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeReport {
    pub output_path: PathBuf,
    pub bitrate: Bitrate,
    pub outcome: EncodeOutcome,
    pub pass1: PassResult,
    pub pass2: PassResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size: Option<OutputSize>,
    pub elapsed_ms: u64,
}

impl EncodeReport {
    pub fn is_success(&self) -> bool {
        self.outcome == EncodeOutcome::Succeeded
    }

    /// Pass 1 failed but pass 2 was still attempted
    pub fn pass1_degraded(&self) -> bool {
        !self.pass1.success
    }

    /// Turn a failed outcome into [`SizeFitError::EncodeFailed`]
    pub fn into_result(self) -> SizeFitResult<Self> {
        match self.outcome {
            EncodeOutcome::Succeeded => Ok(self),
            EncodeOutcome::Failed => Err(SizeFitError::EncodeFailed {
                code: self.pass2.exit_code,
                stderr: self.pass2.stderr_tail(3),
                pass1_degraded: self.pass1_degraded(),
            }),
        }
    }
}
