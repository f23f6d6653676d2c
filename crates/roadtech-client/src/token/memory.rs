//! In-memory token store.
//!
//! Process-local: the session is gone on restart. This is the store for tests
//! and for tools that log in fresh on every run.

use async_trait::async_trait;
use tokio::sync::RwLock;

use roadtech_core::ports::{TokenPair, TokenStore, TokenStoreError};

/// Token store holding the pair in process memory.
pub struct InMemoryTokenStore {
    pair: RwLock<Option<TokenPair>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self {
            pair: RwLock::new(None),
        }
    }

    /// A store pre-loaded with a pair, for tests that start authenticated.
    pub fn with_tokens(pair: TokenPair) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.pair.read().await.as_ref().map(|p| p.access_token.clone())
    }

    async fn refresh_token(&self) -> Option<String> {
        self.pair.read().await.as_ref().map(|p| p.refresh_token.clone())
    }

    async fn set_tokens(&self, pair: TokenPair) -> Result<(), TokenStoreError> {
        *self.pair.write().await = Some(pair);
        Ok(())
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        *self.pair.write().await = None;
        Ok(())
    }
}
