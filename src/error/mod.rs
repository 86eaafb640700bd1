//! Error handling module for SizeFit

use thiserror::Error;

/// Main error type for SizeFit operations
#[derive(Error, Debug)]
pub enum SizeFitError {
    /// Timestamp could not be parsed
    #[error("Invalid timestamp '{input}': {reason}. Expected SS, MM:SS or HH:MM:SS")]
    Parse { input: String, reason: String },

    /// Duration is zero, negative or not finite
    #[error("Invalid duration: {seconds}s (must be greater than zero)")]
    InvalidDuration { seconds: f64 },

    /// Target size is zero, negative or not finite
    #[error("Invalid size target: {megabytes} MB (must be greater than zero)")]
    InvalidSizeTarget { megabytes: f64 },

    /// Encoder executable could not be located
    #[error("Encoder not found: {message}")]
    EncoderNotFound { message: String },

    /// Encoder process could not be started
    #[error("Failed to launch encoder '{program}': {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Pass 2 exited unsuccessfully
    #[error("Encode failed (pass 2 exit code {code:?}{}): {stderr}", degraded_note(.pass1_degraded))]
    EncodeFailed {
        code: Option<i32>,
        stderr: String,
        pass1_degraded: bool,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Encode was interrupted by the caller
    #[error("Encode cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn degraded_note(pass1_degraded: &bool) -> &'static str {
    if *pass1_degraded {
        ", pass 1 also failed"
    } else {
        ""
    }
}

impl SizeFitError {
    pub fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors raised before any encoder process was spawned
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::InvalidDuration { .. } | Self::InvalidSizeTarget { .. }
        )
    }
}

/// Result type alias for SizeFit operations
pub type SizeFitResult<T> = std::result::Result<T, SizeFitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_failed_mentions_degraded_pass1() {
        let err = SizeFitError::EncodeFailed {
            code: Some(1),
            stderr: "boom".to_string(),
            pass1_degraded: true,
        };
        let text = err.to_string();
        assert!(text.contains("pass 1 also failed"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn encode_failed_without_degraded_pass1() {
        let err = SizeFitError::EncodeFailed {
            code: Some(2),
            stderr: String::new(),
            pass1_degraded: false,
        };
        assert!(!err.to_string().contains("pass 1"));
    }

    #[test]
    fn validation_errors_are_classified() {
        assert!(SizeFitError::parse("ab", "not a number").is_validation_error());
        assert!(SizeFitError::InvalidDuration { seconds: 0.0 }.is_validation_error());
        assert!(!SizeFitError::Cancelled.is_validation_error());
    }
}
