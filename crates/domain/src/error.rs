//! Authentication error taxonomy

use thiserror::Error;

/// Errors that can occur during the authentication flow or session handling.
///
/// Every failure during a login attempt triggers ephemeral-storage cleanup
/// before it reaches the caller. Failed attempts are never resumed; the
/// caller restarts the flow with fresh PKCE/state/nonce values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required configuration value is missing or invalid.
    #[error("missing required configuration: {0}")]
    Configuration(String),

    /// Another login attempt is already in flight.
    #[error("a login attempt is already in progress")]
    AttemptInProgress,

    /// The user cancelled the browser authentication session.
    #[error("authentication cancelled by user")]
    UserCancelled,

    /// No callback arrived before the deep-link wait elapsed.
    #[error("authentication timeout - no callback received")]
    Timeout,

    /// The provider redirected back with an error.
    #[error("authentication failed: {message}")]
    Callback {
        /// Provider `error_description`, or `error` code when absent.
        message: String,
    },

    /// The callback state did not match the stored state.
    #[error("invalid state parameter - possible CSRF attack")]
    Csrf,

    /// The token endpoint rejected the exchange or returned an unusable response.
    #[error("token exchange failed: {message}")]
    TokenExchange {
        /// Provider error description or HTTP status text.
        message: String,
    },

    /// The identity token failed signature or claim validation.
    #[error("ID token verification failed: {message}")]
    TokenValidation {
        /// Which check failed.
        message: String,
    },

    /// A secure-storage read or write failed.
    #[error("secure storage error: {message}")]
    Storage {
        /// Underlying storage error description.
        message: String,
    },

    /// The browser session ended in an unrecognized way.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
}

impl AuthError {
    /// True when the failure came from an explicit user action rather than
    /// a protocol or infrastructure fault.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
