//! File-backed token store.
//!
//! The durable store: a small JSON document holding the two fixed keys.
//! Writes go to a sibling temp file first and are renamed into place, so the
//! pair is always replaced as one unit and a crash mid-write cannot leave a
//! half-updated session behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use roadtech_core::ports::{TokenPair, TokenStore, TokenStoreError};

use super::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Token store persisting to a JSON file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the key-value document, treating a missing file as logged out.
    async fn load(&self) -> Option<HashMap<String, String>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "Failed to read token file");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(map) => Some(map),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "Token file is corrupt");
                None
            }
        }
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        self.load().await.and_then(|mut map| map.remove(key))
    }

    /// Write the document atomically: temp file in the same directory, then
    /// rename over the target.
    async fn persist(&self, map: &HashMap<String, String>) -> Result<(), TokenStoreError> {
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|error| TokenStoreError::Corrupt(error.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|error| TokenStoreError::Io(error.to_string()))?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes)
            .await
            .map_err(|error| TokenStoreError::Io(error.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|error| TokenStoreError::Io(error.to_string()))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.read_key(ACCESS_TOKEN_KEY).await
    }

    async fn refresh_token(&self) -> Option<String> {
        self.read_key(REFRESH_TOKEN_KEY).await
    }

    async fn set_tokens(&self, pair: TokenPair) -> Result<(), TokenStoreError> {
        let mut map = HashMap::new();
        map.insert(ACCESS_TOKEN_KEY.to_string(), pair.access_token);
        map.insert(REFRESH_TOKEN_KEY.to_string(), pair.refresh_token);
        self.persist(&map).await
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(TokenStoreError::Io(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileTokenStore {
        let path = std::env::temp_dir().join(format!("roadtech-tokens-{}.json", uuid::Uuid::new_v4()));
        FileTokenStore::new(path)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = temp_store();
        store
            .set_tokens(TokenPair::new("access-1", "refresh-1"))
            .await
            .unwrap();

        assert_eq!(store.access_token().await.as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("refresh-1"));

        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_logged_out() {
        let store = temp_store();
        assert_eq!(store.access_token().await, None);
        assert_eq!(store.refresh_token().await, None);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let store = temp_store();
        store
            .set_tokens(TokenPair::new("a1", "r1"))
            .await
            .unwrap();

        let reopened = FileTokenStore::new(store.path().to_path_buf());
        assert_eq!(reopened.access_token().await.as_deref(), Some("a1"));

        reopened.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = temp_store();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_logged_out() {
        let store = temp_store();
        fs::write(store.path(), b"{ not json").await.unwrap();

        assert_eq!(store.access_token().await, None);

        store.clear().await.unwrap();
    }
}
