//! Terminal adapters for the browser and deep-link ports.
//!
//! The CLI has no embedded browser and no OS deep-link channel, so the
//! hand-off is manual: the user opens the printed URL and pastes the
//! callback URL back.

use async_trait::async_trait;
use portal_application::ports::{AuthBrowser, BrowserOutcome, DeepLinkSource};
use portal_domain::{AuthError, AuthResult};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Manual browser hand-off over stdin/stdout.
pub struct StdioBrowser;

async fn read_line() -> AuthResult<Option<String>> {
    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    let read = reader
        .read_line(&mut line)
        .await
        .map_err(|e| AuthError::AuthenticationFailed(format!("failed to read input: {e}")))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[async_trait]
impl AuthBrowser for StdioBrowser {
    async fn open_auth_session(
        &self,
        auth_url: &str,
        _redirect_uri: &str,
    ) -> AuthResult<BrowserOutcome> {
        println!("Open this URL in your browser to sign in:\n\n  {auth_url}\n");
        println!("Paste the callback URL here (empty line cancels):");

        match read_line().await? {
            Some(line) if !line.is_empty() => Ok(BrowserOutcome::Success { url: line }),
            _ => Ok(BrowserOutcome::Cancelled),
        }
    }

    async fn open_url(&self, url: &str) -> AuthResult<()> {
        println!("Open this URL in your browser to finish signing out:\n\n  {url}\n");
        Ok(())
    }
}

/// Deep-link source for a platform without one: the callback can only
/// arrive through the manual hand-off.
pub struct NoDeepLinks;

#[async_trait]
impl DeepLinkSource for NoDeepLinks {
    async fn wait_for_callback(&self, _scheme: &str) -> String {
        std::future::pending().await
    }
}
