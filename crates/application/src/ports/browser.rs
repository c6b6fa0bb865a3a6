//! External browser session port

use async_trait::async_trait;
use portal_domain::AuthResult;

/// How an external browser authentication session ended.
///
/// `Dismissed` is deliberately distinct from `Cancelled`: on some platforms
/// a successful redirect closes the browser without surfacing a success
/// result, so a dismissal only means "keep waiting for the deep link".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserOutcome {
    /// The browser observed the redirect and returned the callback URL.
    Success {
        /// Full callback URL including query parameters.
        url: String,
    },
    /// The user explicitly cancelled the session.
    Cancelled,
    /// The session closed without reporting success or cancellation.
    Dismissed,
    /// Any other platform-specific result.
    Other(String),
}

/// Port for the OS browser integration.
#[async_trait]
pub trait AuthBrowser: Send + Sync {
    /// Opens a browser authentication session pointed at `auth_url` and
    /// resolves when the session ends. `redirect_uri` is the callback the
    /// browser watches for.
    async fn open_auth_session(
        &self,
        auth_url: &str,
        redirect_uri: &str,
    ) -> AuthResult<BrowserOutcome>;

    /// Opens a URL in the browser without waiting for any callback.
    /// Used for the best-effort remote logout redirect.
    async fn open_url(&self, url: &str) -> AuthResult<()>;
}
