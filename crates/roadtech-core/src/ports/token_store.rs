//! Token storage port - durable client-side credential storage.

use async_trait::async_trait;

/// An access/refresh token pair as minted by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Token storage trait - abstraction over whatever durable key-value storage
/// the platform offers.
///
/// Write discipline: only login, register, logout and the refresh completion
/// handler go through `set_tokens`/`clear`; every other code path reads.
/// Absence of either token means "logged out".
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// The current access token, if any.
    async fn access_token(&self) -> Option<String>;

    /// The current refresh token, if any.
    async fn refresh_token(&self) -> Option<String>;

    /// Replace both tokens as one unit.
    async fn set_tokens(&self, pair: TokenPair) -> Result<(), TokenStoreError>;

    /// Remove both tokens.
    async fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Token storage errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("Storage I/O failed: {0}")]
    Io(String),

    #[error("Stored tokens are corrupt: {0}")]
    Corrupt(String),
}
