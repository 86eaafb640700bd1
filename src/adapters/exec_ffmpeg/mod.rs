//! FFmpeg execution adapter
//!
//! Runs encoder passes as child processes on the tokio runtime. Each call
//! waits for the process to exit before returning, so callers get a strict
//! pass-by-pass ordering.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::model::{PassInvocation, PassResult};
use crate::error::{SizeFitError, SizeFitResult};
use crate::ports::EncoderPort;

/// Encoder looked up on `PATH` when no override is configured
pub const DEFAULT_ENCODER: &str = "ffmpeg";

/// Keep only the last N bytes of captured output
const MAX_CAPTURE_BYTES: usize = 64 * 1024;

const READ_CHUNK_BYTES: usize = 8 * 1024;

/// FFmpeg-based execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    program: PathBuf,
}

impl FFmpegAdapter {
    /// Use `program` as-is without checking that it exists
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the encoder: explicit override first, then `ffmpeg` on `PATH`
    pub fn locate(override_path: Option<&Path>) -> SizeFitResult<Self> {
        let wanted = override_path.unwrap_or_else(|| Path::new(DEFAULT_ENCODER));
        let program = which::which(wanted).map_err(|e| SizeFitError::EncoderNotFound {
            message: format!(
                "'{}' ({}). Install FFmpeg or point --encoder / SIZEFIT_ENCODER at the binary",
                wanted.display(),
                e
            ),
        })?;

        debug!(encoder = %program.display(), "Encoder located");
        Ok(Self::new(program))
    }
}

#[async_trait]
impl EncoderPort for FFmpegAdapter {
    async fn run_pass(&self, invocation: &PassInvocation) -> SizeFitResult<PassResult> {
        debug!(
            pass = invocation.pass.number(),
            program = %self.program.display(),
            args = ?invocation.args,
            working_dir = %invocation.working_dir.display(),
            "Spawning encoder"
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW

        let mut child = cmd.spawn().map_err(|source| SizeFitError::ProcessLaunch {
            program: self.program.display().to_string(),
            source,
        })?;

        // Resolves only once the process has exited and both pipes are drained.
        // Dropping this future kills the child.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let (status, stdout, stderr) = tokio::try_join!(
            child.wait(),
            read_tail(stdout_pipe),
            read_tail(stderr_pipe)
        )?;

        let stdout = capture(&stdout);
        let stderr = capture(&stderr);
        let exit_code = status.code();

        if status.success() {
            info!(pass = invocation.pass.number(), "Encoder pass completed");
        } else {
            warn!(
                pass = invocation.pass.number(),
                code = ?exit_code,
                "Encoder pass exited unsuccessfully"
            );
        }

        Ok(PassResult {
            pass: invocation.pass,
            exit_code,
            success: status.success(),
            stdout,
            stderr,
        })
    }

    fn program(&self) -> String {
        self.program.display().to_string()
    }
}

/// Drain `pipe` to EOF, holding at most [`MAX_CAPTURE_BYTES`] plus one chunk
async fn read_tail<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let Some(mut pipe) = pipe else {
        return Ok(Vec::new());
    };

    let mut kept = Vec::with_capacity(READ_CHUNK_BYTES);
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    loop {
        let read = pipe.read(&mut chunk).await?;
        if read == 0 {
            return Ok(kept);
        }
        kept.extend_from_slice(&chunk[..read]);
        if kept.len() > MAX_CAPTURE_BYTES {
            let excess = kept.len() - MAX_CAPTURE_BYTES;
            kept.drain(..excess);
        }
    }
}

/// Lossy UTF-8 decode of the trailing [`MAX_CAPTURE_BYTES`]; `None` when empty
fn capture(bytes: &[u8]) -> Option<String> {
    let start = bytes.len().saturating_sub(MAX_CAPTURE_BYTES);
    let text = String::from_utf8_lossy(&bytes[start..]);
    let text = text.trim_end();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_trims_and_drops_empty() {
        assert_eq!(capture(b""), None);
        assert_eq!(capture(b"  \n"), None);
        assert_eq!(capture(b"done\n").as_deref(), Some("done"));
    }

    #[test]
    fn capture_keeps_the_tail() {
        let mut bytes = vec![b'a'; MAX_CAPTURE_BYTES];
        bytes.extend_from_slice(b"END");
        let text = capture(&bytes).unwrap();
        assert_eq!(text.len(), MAX_CAPTURE_BYTES);
        assert!(text.ends_with("END"));
    }

    #[tokio::test]
    async fn read_tail_is_bounded_while_reading() {
        let mut noisy = vec![b'x'; MAX_CAPTURE_BYTES * 4];
        noisy.extend_from_slice(b"last line\n");

        let kept = read_tail(Some(noisy.as_slice())).await.unwrap();
        assert_eq!(kept.len(), MAX_CAPTURE_BYTES);
        assert!(kept.ends_with(b"last line\n"));
    }

    #[tokio::test]
    async fn read_tail_without_pipe_is_empty() {
        let kept = read_tail(None::<&[u8]>).await.unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn locate_reports_missing_encoder() {
        let err = FFmpegAdapter::locate(Some(Path::new("/definitely/not/here/ffmpeg"))).unwrap_err();
        assert!(matches!(err, SizeFitError::EncoderNotFound { .. }));
    }
}
