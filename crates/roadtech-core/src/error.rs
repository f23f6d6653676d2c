//! Client-side error taxonomy.

use std::collections::HashMap;

use thiserror::Error;

/// Errors surfaced by the API client and everything built on it.
///
/// `Clone` because a single refresh outcome is fanned out to every request
/// that was queued behind it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        /// Field-keyed validation errors, when the backend provides them.
        errors: HashMap<String, String>,
    },

    /// A protected request failed and could not be refreshed. Tokens are
    /// already cleared when this is returned; the caller decides what
    /// "go to login" means.
    #[error("not authenticated")]
    Unauthenticated,

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Local token storage failed underneath an auth operation.
    #[error("token storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Status code, when the error came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
