//! Error types for the cx-proto crate.

use thiserror::Error;

/// Errors that can occur while decoding platform payloads.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Failed to decode a payload.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A numeric status code outside the known range.
    #[error("unknown {kind} code: {code}")]
    UnknownCode {
        /// Which code family was being decoded.
        kind: &'static str,
        /// The offending value.
        code: u8,
    },

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for ProtoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decoding(err.to_string())
    }
}
