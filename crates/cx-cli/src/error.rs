//! CLI error types.

use cx_core::{CoreError, ResolveError};
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The platform answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the status reason.
        message: String,
    },

    /// The request never got an answer.
    #[error("connection error: {0}")]
    Transport(String),

    /// Resolution, polling or build wait failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A remote action finished unsuccessfully. Already shown to the user.
    #[error("{message}")]
    ActionFailed {
        /// The outcome message as rendered.
        message: String,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Whether the error has already been printed to the user.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::ActionFailed { .. })
    }

    /// Process exit code for the error.
    ///
    /// Usage errors exit through clap with code 2 and never reach here.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn exit_code(&self) -> u8 {
        1
    }
}

impl From<ResolveError> for CliError {
    fn from(err: ResolveError) -> Self {
        Self::Core(CoreError::Resolve(err))
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Format(format!("unexpected response body: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(format!("JSON serialization failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = CliError::Api {
            status: 404,
            message: "stack not found".into(),
        };
        assert_eq!(err.to_string(), "API error (404): stack not found");
    }

    #[test]
    fn resolve_error_passes_through() {
        let err = CliError::from(ResolveError::NotFound("lion".into()));
        assert_eq!(err.to_string(), "lion not found");
        assert!(!err.is_reported());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn action_failure_is_reported() {
        let err = CliError::ActionFailed {
            message: "Failed!".into(),
        };
        assert!(err.is_reported());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn timeout_message_passes_through() {
        let err = CliError::from(CoreError::PollTimeout { secs: 600 });
        assert_eq!(err.to_string(), "timed-out after 600 second(s)");
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }
}
