//! Token endpoint client for the authorization code grant.

use async_trait::async_trait;
use portal_application::ports::TokenExchanger;
use portal_domain::{AuthError, AuthResult, OidcConfig, TokenSet};
use serde::Deserialize;
use tracing::debug;

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Token response from the token endpoint.
///
/// `id_token` is required here even though OAuth2 makes it optional; this
/// client only serves the OIDC flow and a response without an identity
/// token cannot produce a session.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    token_type: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Error response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Reqwest-backed [`TokenExchanger`].
///
/// Confidential clients authenticate with an HTTP Basic header; public
/// clients send `client_id` in the form body. Redirects are never followed.
pub struct TokenClient {
    http: reqwest::Client,
    config: OidcConfig,
}

impl TokenClient {
    /// Creates a client over an existing reqwest client.
    #[must_use]
    pub const fn new(http: reqwest::Client, config: OidcConfig) -> Self {
        Self { http, config }
    }

    fn form_body(&self, code: &str, code_verifier: &str) -> AuthResult<String> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.config.redirect_uri),
            ("code_verifier", code_verifier),
        ];
        if !self.config.is_confidential() {
            params.push(("client_id", &self.config.client_id));
        }
        serde_urlencoded::to_string(&params).map_err(|e| AuthError::TokenExchange {
            message: format!("failed to encode form: {e}"),
        })
    }

    fn basic_auth_header(&self) -> Option<String> {
        use base64::Engine;
        if !self.config.is_confidential() {
            return None;
        }
        self.config.client_secret.as_deref().map(|secret| {
            let credentials = format!("{}:{secret}", self.config.client_id);
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
            format!("Basic {encoded}")
        })
    }
}

#[async_trait]
impl TokenExchanger for TokenClient {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> AuthResult<TokenSet> {
        let body = self.form_body(code, code_verifier)?;

        let mut request = self
            .http
            .post(&self.config.token_url)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .header("Accept", "application/json")
            .body(body);
        if let Some(authorization) = self.basic_auth_header() {
            request = request.header("Authorization", authorization);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&error_text)
                .map_or_else(
                    |_| format!("token request failed: {status}"),
                    |e| e.error_description.unwrap_or(e.error),
                );
            return Err(AuthError::TokenExchange { message });
        }

        let body = response.text().await.map_err(|e| AuthError::TokenExchange {
            message: format!("failed to read token response: {e}"),
        })?;

        // Some providers report failures in a 2xx body; an `error` field
        // always wins over whatever else the body carries.
        if let Ok(error_response) = serde_json::from_str::<TokenErrorResponse>(&body) {
            return Err(AuthError::TokenExchange {
                message: error_response
                    .error_description
                    .unwrap_or(error_response.error),
            });
        }

        let token_response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::TokenExchange {
                message: format!("failed to parse token response: {e}"),
            })?;
        debug!(token_type = %token_response.token_type, "token exchange completed");

        Ok(TokenSet {
            id_token: token_response.id_token,
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
            token_type: token_response.token_type,
            expires_in: token_response.expires_in,
            scope: token_response.scope,
        })
    }
}
