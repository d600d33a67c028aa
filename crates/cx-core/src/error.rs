//! Error types for the engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// A user-typed name could not be mapped to exactly one entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// More than one entity matches and no first-wins policy applies.
    #[error("'{0}' is ambiguous, please be more specific or provide an environment")]
    Ambiguous(String),

    /// Nothing matches.
    #[error("{0} not found")]
    NotFound(String),
}

/// Errors raised while resolving, submitting or waiting.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Target resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Fetching from or submitting to the platform failed.
    #[error("{0}")]
    Transport(String),

    /// The wait budget ran out while the action was still pending.
    #[error("timed-out after {secs} second(s)")]
    PollTimeout {
        /// Whole seconds of the budget.
        secs: u64,
    },

    /// A poll policy that cannot observe a single refresh.
    #[error("invalid poll policy: {0}")]
    InvalidPolicy(String),

    /// The wait was interrupted by the user.
    #[error("interrupted")]
    Cancelled,

    /// A stack build ended in a failure state.
    #[error("build failed: {0}")]
    BuildFailed(String),

    /// A concurrent lookup ended without reporting.
    #[error("lookup aborted: expected {expected} result(s), received {received}")]
    LookupAborted {
        /// Lookups dispatched.
        expected: usize,
        /// Results received.
        received: usize,
    },

    /// Writing progress output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Wrap any transport failure.
    #[must_use]
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_messages() {
        assert_eq!(
            ResolveError::NotFound("zebra".into()).to_string(),
            "zebra not found"
        );
        assert_eq!(
            ResolveError::Ambiguous("or".into()).to_string(),
            "'or' is ambiguous, please be more specific or provide an environment"
        );
    }

    #[test]
    fn timeout_message() {
        let err = CoreError::PollTimeout { secs: 600 };
        assert_eq!(err.to_string(), "timed-out after 600 second(s)");
    }

    #[test]
    fn resolve_error_is_transparent() {
        let err = CoreError::from(ResolveError::NotFound("web".into()));
        assert_eq!(err.to_string(), "web not found");
    }
}
