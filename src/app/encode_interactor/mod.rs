// Encode interactor - Orchestrates the two-pass size-targeted encode

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::error::SizeFitResult;
use crate::output::{measure_output, prepare_output_path};
use crate::planner::{BitratePlanner, SizeTarget};
use crate::ports::EncoderPort;

/// Discard sink for the pass-1 output
#[cfg(windows)]
pub const NULL_SINK: &str = "NUL";
#[cfg(not(windows))]
pub const NULL_SINK: &str = "/dev/null";

/// Pass-log prefix inside the per-request pass-log directory
const PASSLOG_PREFIX: &str = "ffmpeg2pass";

/// Global flags every pass starts with: never prompt, never read stdin
const PASS_PREAMBLE: [&str; 2] = ["-y", "-nostdin"];

/// Raw encode request as collected from the user
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub input: String,
    pub size_mb: f64,
    pub start: String,
    pub end: String,
    pub output: PathBuf,
    /// Base argument template, see [`render_template`]
    pub base_args: Vec<String>,
}

impl EncodeRequest {
    /// Validate the request and derive its [`EncodeCommand`].
    ///
    /// Timestamp, duration and size errors all surface here, before any
    /// process is spawned or any file is touched.
    pub fn prepare(&self) -> SizeFitResult<EncodeCommand> {
        let range = ClipRange::from_timestamps(&self.start, &self.end)?;
        let target = SizeTarget::new(self.size_mb)?;
        let bitrate = BitratePlanner::new().plan_for_target(target, range.duration_seconds())?;

        info!(
            start = %range.start,
            end = %range.end,
            duration_seconds = range.duration_seconds(),
            bitrate_kbps = bitrate.kbps,
            "Prepared encode"
        );

        let args = render_template(&self.base_args, &self.input, &range);
        Ok(EncodeCommand::new(args, &self.output, bitrate)?.with_target(target))
    }
}

/// Substitute `{input}`, `{start}`, `{end}` and `{duration}` in every argument.
/// Anything else is passed through untouched.
pub fn render_template(template: &[String], input: &str, range: &ClipRange) -> Vec<String> {
    let duration = range.duration_seconds().to_string();
    template
        .iter()
        .map(|arg| {
            arg.replace("{input}", input)
                .replace("{start}", range.start.as_str())
                .replace("{end}", range.end.as_str())
                .replace("{duration}", &duration)
        })
        .collect()
}

/// Interactor for the two-pass encode use case
pub struct EncodeInteractor {
    encoder: Arc<dyn EncoderPort>,
    container: String,
    passlog_root: Option<PathBuf>,
}

impl EncodeInteractor {
    /// Create new encode interactor with injected encoder port
    pub fn new(encoder: Arc<dyn EncoderPort>, container: impl Into<String>) -> Self {
        Self {
            encoder,
            container: container.into(),
            passlog_root: None,
        }
    }

    /// Create per-request pass-log directories under `root` instead of the system temp dir
    pub fn with_passlog_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.passlog_root = Some(root.into());
        self
    }

    /// Run pass 1 then pass 2 and report both.
    ///
    /// Pass 2 always runs once pass 1 has exited, even if pass 1 failed; the
    /// outcome follows pass 2 and a failed pass 1 shows up as
    /// [`EncodeReport::pass1_degraded`]. `Err` is returned only when a pass
    /// could not be run at all, in which case no further pass is attempted.
    ///
    /// Both passes run in the caller's current directory so relative paths
    /// in the arguments keep their meaning. Only the pass-log statistics go
    /// to a private directory, removed when this returns or is dropped.
    pub async fn encode(&self, command: &EncodeCommand) -> SizeFitResult<EncodeReport> {
        let started = Instant::now();
        let mut state = EncodeState::Idle;

        let caller_dir = std::env::current_dir()?;
        let output_path = prepare_output_path(command.output_path(), &caller_dir)?;
        let passlog_dir = self.create_passlog_dir()?;
        let passlog = passlog_dir.path().join(PASSLOG_PREFIX);

        info!(
            encoder = %self.encoder.program(),
            output = %output_path.display(),
            bitrate_kbps = command.bitrate().kbps,
            "Starting two-pass encode"
        );

        advance(&mut state, EncodeState::Pass1Running);
        let pass1 = self
            .encoder
            .run_pass(&self.pass_invocation(PassIndex::First, command, &passlog, &caller_dir, None))
            .await
            .inspect_err(|_| advance(&mut state, EncodeState::Failed))?;

        if !pass1.success {
            warn!(
                code = ?pass1.exit_code,
                stderr = %pass1.stderr_tail(3),
                "Pass 1 failed, continuing with pass 2"
            );
        }

        advance(&mut state, EncodeState::Pass2Running);
        let pass2 = self
            .encoder
            .run_pass(&self.pass_invocation(
                PassIndex::Second,
                command,
                &passlog,
                &caller_dir,
                Some(&output_path),
            ))
            .await
            .inspect_err(|_| advance(&mut state, EncodeState::Failed))?;

        let (outcome, output_size) = if pass2.success {
            advance(&mut state, EncodeState::Succeeded);
            let size = measure_output(&output_path, command.target())
                .inspect_err(|e| warn!(error = %e, "Could not measure output"))
                .ok();
            (EncodeOutcome::Succeeded, size)
        } else {
            advance(&mut state, EncodeState::Failed);
            warn!(
                code = ?pass2.exit_code,
                stderr = %pass2.stderr_tail(3),
                "Pass 2 failed, output is unreliable"
            );
            (EncodeOutcome::Failed, None)
        };
        debug_assert!(state.is_terminal());

        let report = EncodeReport {
            output_path,
            bitrate: command.bitrate(),
            outcome,
            pass1,
            pass2,
            output_size,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            outcome = ?report.outcome,
            pass1_degraded = report.pass1_degraded(),
            elapsed_ms = report.elapsed_ms,
            "Two-pass encode finished"
        );
        Ok(report)
    }

    /// Preamble, base args, bitrate, then the pass-specific suffix
    pub fn pass_invocation(
        &self,
        pass: PassIndex,
        command: &EncodeCommand,
        passlog: &Path,
        working_dir: &Path,
        output: Option<&Path>,
    ) -> PassInvocation {
        let mut args: Vec<String> = PASS_PREAMBLE.iter().map(|s| s.to_string()).collect();
        args.extend_from_slice(command.base_args());
        args.extend([
            "-b:v".to_string(),
            command.bitrate().as_encoder_value(),
            "-pass".to_string(),
            pass.number().to_string(),
            "-passlogfile".to_string(),
            passlog.display().to_string(),
        ]);

        match (pass, output) {
            (PassIndex::Second, Some(output)) => args.push(output.display().to_string()),
            _ => args.extend([
                "-f".to_string(),
                self.container.clone(),
                NULL_SINK.to_string(),
            ]),
        }

        PassInvocation {
            pass,
            args,
            working_dir: working_dir.to_path_buf(),
        }
    }

    fn create_passlog_dir(&self) -> SizeFitResult<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("sizefit-");
        let dir = match &self.passlog_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        debug!(passlog_dir = %dir.path().display(), "Created pass-log directory");
        Ok(dir)
    }
}

fn advance(state: &mut EncodeState, next: EncodeState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal encode transition {:?} -> {:?}",
        state,
        next
    );
    debug!(from = ?state, to = ?next, "Encode state");
    *state = next;
}
