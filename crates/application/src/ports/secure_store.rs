//! Secure key/value storage port

use async_trait::async_trait;
use portal_domain::AuthResult;

/// Port for secure at-rest key/value storage.
///
/// Backs both the ephemeral exchange store and the session store. Values
/// are opaque strings; callers own serialization. Failures map to
/// [`portal_domain::AuthError::Storage`].
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> AuthResult<()>;

    /// Deletes the value under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AuthResult<()>;
}
