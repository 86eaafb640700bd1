//! SizeFit CLI Library
//!
//! Size-targeted two-pass video encoding: timestamp conversion, bitrate
//! planning, and orchestration of the two encoder passes.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{EncodeInteractor, EncodeRequest};
pub use domain::model::{EncodeCommand, EncodeOutcome, EncodeReport, PassIndex, PassResult};
pub use error::{SizeFitError, SizeFitResult};
pub use planner::{Bitrate, BitratePlanner, SizeTarget};
pub use utils::time::{CanonicalTimestamp, TimeParser};
