//! Persisted session storage with expiry-on-read.

use std::sync::Arc;

use portal_domain::{AuthError, AuthResult, PortalSession, SESSION_KEY};
use tracing::{debug, warn};

use crate::ports::{Clock, SecureStore};

/// Owner of the persisted session blob.
///
/// Every read path enforces expiry: a session at or past its `expiresAt`
/// is cleared synchronously and reported as absent. Corrupt or unreadable
/// stored data also reads as "no session" — a missing session is a safe,
/// recoverable state, so read failures never propagate.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn SecureStore>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Creates a session store over the given backend and clock.
    #[must_use]
    pub fn new(store: Arc<dyn SecureStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Persists the session as a single JSON blob.
    ///
    /// # Errors
    ///
    /// Propagates serialization and secure-storage write failures as
    /// [`AuthError::Storage`].
    pub async fn store(&self, session: &PortalSession) -> AuthResult<()> {
        let json = serde_json::to_string(session).map_err(|e| AuthError::Storage {
            message: format!("failed to serialize session: {e}"),
        })?;
        self.store.set(SESSION_KEY, &json).await
    }

    /// Reads the current session, or `None` when absent, expired, or
    /// unreadable. Callers receive a fresh deserialized copy per read.
    pub async fn get(&self) -> Option<PortalSession> {
        let data = match self.store.get(SESSION_KEY).await {
            Ok(data) => data?,
            Err(error) => {
                warn!(%error, "failed to read stored session");
                return None;
            }
        };

        let session: PortalSession = match serde_json::from_str(&data) {
            Ok(session) => session,
            Err(error) => {
                warn!(%error, "stored session is corrupt, treating as absent");
                return None;
            }
        };

        if session.is_expired_at(self.clock.now_millis()) {
            debug!("session token expired, clearing session");
            if let Err(error) = self.clear().await {
                warn!(%error, "failed to clear expired session");
            }
            return None;
        }

        Some(session)
    }

    /// Deletes the persisted session.
    ///
    /// # Errors
    ///
    /// Propagates secure-storage delete failures.
    pub async fn clear(&self) -> AuthResult<()> {
        self.store.delete(SESSION_KEY).await
    }

    /// True when a live (non-expired) session exists.
    pub async fn is_authenticated(&self) -> bool {
        self.get().await.is_some()
    }
}
