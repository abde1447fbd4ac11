//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Remote-call
//! failures are recovered at the command boundary and turned into
//! user-visible conversation content — these types carry the context
//! needed for those messages.

use thiserror::Error;

/// Errors that can occur while talking to the remote generation API.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The API credential environment variable is not set. Fatal at first
    /// use of the client.
    #[error("{var} environment variable not set")]
    MissingCredential { var: String },

    /// TCP/TLS connection to the API endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The endpoint did not respond within the configured timeout.
    #[error("request timeout after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-2xx HTTP response from the endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },
}

impl InferenceError {
    /// The message shown inside a synthetic error turn.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
