// Ports - Interface definitions (contracts)

use async_trait::async_trait;

use crate::domain::model::{PassInvocation, PassResult};
use crate::error::SizeFitResult;

/// Port for running one encoder pass as an external process
#[async_trait]
pub trait EncoderPort: Send + Sync {
    /// Spawn the encoder with `invocation.args` inside `invocation.working_dir`
    /// and wait until the process has exited.
    ///
    /// A non-zero exit is reported through [`PassResult::success`], not as an
    /// error. `Err` means the process never ran (e.g. `ProcessLaunch`).
    async fn run_pass(&self, invocation: &PassInvocation) -> SizeFitResult<PassResult>;

    /// Human-readable name of the encoder program, for logs
    fn program(&self) -> String;
}
