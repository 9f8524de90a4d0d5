//! Crate-wide error type
//!
//! Transport loss is not an error here: the connection manager absorbs it
//! into the reconnect state machine and surfaces it as a status value. What
//! remains are collaborator (REST) failures and payload validation.

use thiserror::Error;

/// Result alias used across the crate
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced to callers of the REST surface and payload builders
#[derive(Debug, Error)]
pub enum SyncError {
    /// The collaborator server cannot be reached at all
    #[error("server is unavailable")]
    Unavailable,

    /// The collaborator answered with a non-success status
    #[error("server returned {status}: {detail}")]
    Api { status: u16, detail: String },

    /// HTTP-level failure that is not a connect error
    #[error("http request failed: {0}")]
    Http(reqwest::Error),

    /// A product payload failed client-side validation
    #[error("invalid product: {0}")]
    Invalid(String),
}

impl SyncError {
    /// Classify a reqwest error: connection-level failures collapse into
    /// [`SyncError::Unavailable`] so callers can show one "server down"
    /// state instead of a transport stack trace.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Unavailable
        } else {
            Self::Http(err)
        }
    }
}
