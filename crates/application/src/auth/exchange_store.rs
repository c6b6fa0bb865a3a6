//! Ephemeral storage for in-flight authorization artifacts.
//!
//! The verifier, state, and nonce of a login attempt live here between the
//! authorization redirect and the callback. Each value is read-once:
//! `take_*` deletes on read, so a replayed callback finds nothing. The
//! `cleanup` routine runs on every exit path of the flow, win or lose.

use std::sync::Arc;

use portal_domain::{AuthResult, OAUTH_NONCE_KEY, OAUTH_STATE_KEY, OAUTH_VERIFIER_KEY};
use tracing::warn;

use crate::auth::pkce::PkceAttempt;
use crate::ports::SecureStore;

/// Read-once store for the current attempt's secrets.
#[derive(Clone)]
pub struct ExchangeStore {
    store: Arc<dyn SecureStore>,
}

impl ExchangeStore {
    /// Creates a store over the given secure backend.
    #[must_use]
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store }
    }

    /// Persists the attempt's verifier, state, and nonce.
    ///
    /// # Errors
    ///
    /// Propagates secure-storage write failures.
    pub async fn store_attempt(&self, attempt: &PkceAttempt) -> AuthResult<()> {
        self.store
            .set(OAUTH_VERIFIER_KEY, &attempt.code_verifier)
            .await?;
        self.store.set(OAUTH_STATE_KEY, &attempt.state).await?;
        self.store.set(OAUTH_NONCE_KEY, &attempt.nonce).await?;
        Ok(())
    }

    /// Reads and deletes the stored CSRF state.
    ///
    /// # Errors
    ///
    /// Propagates secure-storage failures.
    pub async fn take_state(&self) -> AuthResult<Option<String>> {
        self.take(OAUTH_STATE_KEY).await
    }

    /// Reads and deletes the stored code verifier.
    ///
    /// # Errors
    ///
    /// Propagates secure-storage failures.
    pub async fn take_verifier(&self) -> AuthResult<Option<String>> {
        self.take(OAUTH_VERIFIER_KEY).await
    }

    /// Reads and deletes the stored nonce.
    ///
    /// # Errors
    ///
    /// Propagates secure-storage failures.
    pub async fn take_nonce(&self) -> AuthResult<Option<String>> {
        self.take(OAUTH_NONCE_KEY).await
    }

    /// Unconditionally deletes all three keys.
    ///
    /// Invoked from the flow's single finalization point on every exit path;
    /// individual delete failures are logged and swallowed so cleanup never
    /// masks the original outcome.
    pub async fn cleanup(&self) {
        for key in [OAUTH_STATE_KEY, OAUTH_VERIFIER_KEY, OAUTH_NONCE_KEY] {
            if let Err(error) = self.store.delete(key).await {
                warn!(%error, key, "failed to delete ephemeral auth value");
            }
        }
    }

    async fn take(&self, key: &str) -> AuthResult<Option<String>> {
        let value = self.store.get(key).await?;
        if value.is_some() {
            self.store.delete(key).await?;
        }
        Ok(value)
    }
}
