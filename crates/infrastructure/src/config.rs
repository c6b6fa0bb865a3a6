//! Environment-based configuration loading.
//!
//! All settings come from `OIDC_*` variables. Endpoint URLs left unset are
//! resolved from the provider discovery document, so a minimal deployment
//! only needs the client id, redirect URI and issuer.

use portal_domain::{
    AuthResult, DEFAULT_POST_LOGOUT_REDIRECT_URI, DEFAULT_SCOPE, OidcConfig,
};
use tracing::debug;

use crate::validation::DiscoveryClient;

fn var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Reads the OIDC configuration from the environment.
///
/// Validation is deferred to [`resolve_endpoints`] / the flow constructor,
/// since missing endpoint URLs may still be filled in from discovery.
#[must_use]
pub fn load_from_env() -> OidcConfig {
    OidcConfig {
        client_id: var("OIDC_CLIENT_ID"),
        client_secret: std::env::var("OIDC_CLIENT_SECRET").ok().filter(|s| !s.is_empty()),
        redirect_uri: var("OIDC_REDIRECT_URI"),
        authorize_url: var("OIDC_AUTHORIZE_URL"),
        token_url: var("OIDC_TOKEN_URL"),
        userinfo_url: var("OIDC_USERINFO_URL"),
        jwks_url: var("OIDC_JWKS_URL"),
        logout_url: var("OIDC_LOGOUT_URL"),
        issuer: var("OIDC_ISSUER"),
        scope: std::env::var("OIDC_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string()),
        post_logout_redirect_uri: std::env::var("OIDC_POST_LOGOUT_REDIRECT_URI")
            .unwrap_or_else(|_| DEFAULT_POST_LOGOUT_REDIRECT_URI.to_string()),
    }
}

/// Fills endpoint URLs the environment left empty from the provider
/// discovery document, then validates the result.
///
/// # Errors
///
/// [`portal_domain::AuthError::Configuration`] when discovery fails or a
/// required setting is still missing afterwards.
pub async fn resolve_endpoints(
    config: &mut OidcConfig,
    discovery: &DiscoveryClient,
) -> AuthResult<()> {
    let needs_discovery = config.authorize_url.is_empty()
        || config.token_url.is_empty()
        || config.userinfo_url.is_empty()
        || config.jwks_url.is_empty()
        || config.logout_url.is_empty();

    if needs_discovery && !config.issuer.is_empty() {
        let document = discovery.document().await?;
        debug!("filling endpoint URLs from discovery");
        fill(&mut config.authorize_url, Some(document.authorization_endpoint));
        fill(&mut config.token_url, Some(document.token_endpoint));
        fill(&mut config.userinfo_url, document.userinfo_endpoint);
        fill(&mut config.jwks_url, Some(document.jwks_uri));
        fill(&mut config.logout_url, document.end_session_endpoint);
    }

    config.validate()
}

fn fill(target: &mut String, source: Option<String>) {
    if target.is_empty()
        && let Some(value) = source
    {
        *target = value;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fill_only_overwrites_empty_targets() {
        let mut target = String::new();
        fill(&mut target, Some("a".to_string()));
        assert_eq!(target, "a");

        fill(&mut target, Some("b".to_string()));
        assert_eq!(target, "a");

        let mut untouched = String::new();
        fill(&mut untouched, None);
        assert_eq!(untouched, "");
    }
}
