//! OIDC provider configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AuthError, AuthResult};

/// Default scope requested from the identity provider.
pub const DEFAULT_SCOPE: &str = "openid document personal_info profile auth_info email";

/// Default post-logout redirect when none is configured.
pub const DEFAULT_POST_LOGOUT_REDIRECT_URI: &str = "http://localhost:8080/logout";

/// Configuration for the identity provider integration.
///
/// All URLs point at provider endpoints; `redirect_uri` is the app's
/// registered custom-scheme callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcConfig {
    /// OAuth2/OIDC client identifier.
    pub client_id: String,
    /// Client secret for confidential clients. Public clients leave this unset.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Registered callback URI (custom scheme).
    pub redirect_uri: String,
    /// Authorization endpoint.
    pub authorize_url: String,
    /// Token endpoint.
    pub token_url: String,
    /// Userinfo endpoint.
    pub userinfo_url: String,
    /// JWKS endpoint publishing the provider signing keys.
    pub jwks_url: String,
    /// End-session endpoint.
    pub logout_url: String,
    /// Expected token issuer.
    pub issuer: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Where the provider sends the browser after remote logout.
    pub post_logout_redirect_uri: String,
}

impl OidcConfig {
    /// Validates that every required field is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] naming the first missing field.
    /// Runs before any network call so misconfiguration fails fast.
    pub fn validate(&self) -> AuthResult<()> {
        let required = [
            ("client_id", &self.client_id),
            ("redirect_uri", &self.redirect_uri),
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("userinfo_url", &self.userinfo_url),
            ("jwks_url", &self.jwks_url),
            ("logout_url", &self.logout_url),
            ("issuer", &self.issuer),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AuthError::Configuration(name.to_string()));
            }
        }
        Ok(())
    }

    /// Custom URI scheme of the redirect URI, used to match deep-link events.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the redirect URI has no scheme.
    pub fn callback_scheme(&self) -> AuthResult<String> {
        match Url::parse(&self.redirect_uri) {
            Ok(url) => Ok(url.scheme().to_string()),
            Err(_) => Err(AuthError::Configuration("redirect_uri".to_string())),
        }
    }

    /// True when a client secret is configured (confidential client).
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.client_secret
            .as_deref()
            .is_some_and(|s| !s.is_empty())
    }
}

/// Secure-storage key for the in-flight CSRF state.
pub const OAUTH_STATE_KEY: &str = "gubuy_oauth_state";
/// Secure-storage key for the in-flight PKCE code verifier.
pub const OAUTH_VERIFIER_KEY: &str = "gubuy_oauth_code_verifier";
/// Secure-storage key for the in-flight replay nonce.
pub const OAUTH_NONCE_KEY: &str = "gubuy_oauth_nonce";
/// Secure-storage key for the persisted session blob.
pub const SESSION_KEY: &str = "portal_session";
