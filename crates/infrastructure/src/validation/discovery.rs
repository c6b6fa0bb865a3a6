//! OpenID Connect discovery document client.

use portal_domain::{AuthError, AuthResult};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// The subset of `/.well-known/openid-configuration` this client uses.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryDocument {
    /// Issuer identifier as published by the provider.
    pub issuer: String,
    /// Authorization endpoint.
    pub authorization_endpoint: String,
    /// Token endpoint.
    pub token_endpoint: String,
    /// Userinfo endpoint.
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    /// JWKS endpoint.
    pub jwks_uri: String,
    /// RP-initiated logout endpoint.
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

/// Fetches and caches the provider discovery document.
///
/// The document is fetched once; concurrent first callers serialize on the
/// cache lock so the endpoint is hit a single time. A failed fetch leaves
/// the cache empty and the next call retries.
pub struct DiscoveryClient {
    http: reqwest::Client,
    issuer: String,
    cached: Mutex<Option<DiscoveryDocument>>,
}

impl DiscoveryClient {
    /// Creates a client for the given issuer.
    #[must_use]
    pub fn new(http: reqwest::Client, issuer: String) -> Self {
        Self {
            http,
            issuer,
            cached: Mutex::new(None),
        }
    }

    /// Returns the discovery document, fetching it on first use.
    ///
    /// # Errors
    ///
    /// [`AuthError::Configuration`] when the document cannot be fetched or
    /// parsed.
    pub async fn document(&self) -> AuthResult<DiscoveryDocument> {
        let mut cached = self.cached.lock().await;
        if let Some(document) = cached.as_ref() {
            return Ok(document.clone());
        }

        let url = format!(
            "{}/.well-known/openid-configuration",
            self.issuer.trim_end_matches('/')
        );
        match self.fetch(&url).await {
            Ok(document) => {
                debug!(issuer = %document.issuer, "discovery document loaded");
                *cached = Some(document.clone());
                Ok(document)
            }
            Err(error) => {
                warn!(%error, %url, "discovery fetch failed");
                Err(error)
            }
        }
    }

    async fn fetch(&self, url: &str) -> AuthResult<DiscoveryDocument> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::Configuration(format!("discovery fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::Configuration(format!(
                "discovery endpoint returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Configuration(format!("invalid discovery document: {e}")))
    }
}
