//! Domain types for the health portal authentication core.
//!
//! Pure data and invariants only: no I/O, no async, no framework types.
//! The application layer orchestrates these through ports; infrastructure
//! adapters talk to the provider and to secure storage.

pub mod auth;
pub mod config;
pub mod error;
pub mod session;

pub use auth::{Audience, IdentityClaims, TokenSet, UserInfo};
pub use config::{
    DEFAULT_POST_LOGOUT_REDIRECT_URI, DEFAULT_SCOPE, OAUTH_NONCE_KEY, OAUTH_STATE_KEY,
    OAUTH_VERIFIER_KEY, OidcConfig, SESSION_KEY,
};
pub use error::{AuthError, AuthResult};
pub use session::{
    AccessInfo, PortalSession, SessionAttributes, SessionTokens, SessionUser,
};
