//! Error types for the completion boundary and the persistent store.
//!
//! Generation failures never abort a turn: the session renders them into
//! an assistant message. Store read failures are absorbed into a fallback
//! load. Store write failures are the only errors a caller has to handle.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a completion provider call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The API answered 200 with an error object.
    #[error("API error: {0}")]
    Api(String),

    /// The response body could not be decoded.
    #[error("{0}")]
    Parse(String),

    /// The model returned no text.
    #[error("empty response from model")]
    EmptyResponse,

    /// The provider is misconfigured (missing key, bad client settings).
    #[error("configuration error: {0}")]
    Config(String),
}

impl GenerationError {
    /// Whether the failure is worth retrying (rate limits, 5xx, network).
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Transport(_) => true,
            GenerationError::Http { status, .. } => *status == 429 || *status >= 500,
            GenerationError::EmptyResponse => true,
            _ => false,
        }
    }

    /// Whether the failure can never succeed on retry (bad request, auth).
    pub fn is_permanent(&self) -> bool {
        match self {
            GenerationError::Http { status, .. } => {
                matches!(status, 400 | 401 | 403 | 404 | 422)
            }
            GenerationError::Config(_) => true,
            _ => false,
        }
    }
}

/// Failure of a persistent store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or malformed persisted data. Downgraded to an empty state on load.
    #[error("failed to read state from {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The state could not be written.
    #[error("failed to write state to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state could not be serialized.
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}
