//! File-backed secure store.
//!
//! Values are kept in a single JSON object file. The file holds session
//! material, so it lives under the user data directory and should never be
//! committed anywhere.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use portal_application::ports::SecureStore;
use portal_domain::{AuthError, AuthResult};
use tokio::sync::Mutex;

/// File-backed [`SecureStore`].
///
/// Writes are serialized through a lock; each mutation rewrites the whole
/// file. The store is small (a handful of keys) so this is not a problem.
pub struct FileSecureStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSecureStore {
    /// Creates a store backed by the given file.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// The default store location under the user data directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("portal-auth")
            .join("store.json")
    }

    async fn read_map(path: &Path) -> AuthResult<HashMap<String, String>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| AuthError::Storage {
                message: format!("store file is not valid JSON: {e}"),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(AuthError::Storage {
                message: format!("failed to read store file: {e}"),
            }),
        }
    }

    async fn write_map(path: &Path, map: &HashMap<String, String>) -> AuthResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthError::Storage {
                    message: format!("failed to create store directory: {e}"),
                })?;
        }
        let bytes = serde_json::to_vec_pretty(map).map_err(|e| AuthError::Storage {
            message: format!("failed to encode store file: {e}"),
        })?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| AuthError::Storage {
                message: format!("failed to write store file: {e}"),
            })
    }
}

#[async_trait]
impl SecureStore for FileSecureStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let map = Self::read_map(&self.path).await?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = Self::read_map(&self.path).await?;
        map.insert(key.to_string(), value.to_string());
        Self::write_map(&self.path, &map).await
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = Self::read_map(&self.path).await?;
        if map.remove(key).is_some() {
            Self::write_map(&self.path, &map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileSecureStore {
        FileSecureStore::new(dir.path().join("store.json"))
    }

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn values_survive_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).set("k", "v").await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn deleting_a_missing_key_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).delete("missing").await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_reports_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = FileSecureStore::new(path);
        assert!(matches!(
            store.get("k").await,
            Err(AuthError::Storage { .. })
        ));
    }
}
