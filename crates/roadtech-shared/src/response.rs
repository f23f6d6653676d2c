//! The backend's error payload shape.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error body the backend attaches to non-success responses.
///
/// Every field is optional on the wire; the client only depends on "does a
/// human-readable message exist", not on the full shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field-keyed validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ErrorBody {
    /// Best-effort parse of a raw response body.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// The human-readable message, falling back to the status line when the
    /// backend sent none.
    pub fn message_or_status(&self, status: u16) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("HTTP {status}"))
    }

    /// Validation errors, empty when absent.
    pub fn field_errors(&self) -> HashMap<String, String> {
        self.errors.clone().unwrap_or_default()
    }
}
