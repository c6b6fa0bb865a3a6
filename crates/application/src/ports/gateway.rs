//! Provider gateway ports: token exchange, token verification, userinfo.

use async_trait::async_trait;
use portal_domain::{AuthResult, IdentityClaims, TokenSet, UserInfo};

/// Port for the provider token endpoint.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Exchanges an authorization code (plus the PKCE verifier) for tokens.
    ///
    /// # Errors
    ///
    /// [`portal_domain::AuthError::TokenExchange`] on a non-success HTTP
    /// status, an `error` field in the response body, or a response without
    /// an `id_token`.
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> AuthResult<TokenSet>;
}

/// Port for identity token verification.
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    /// Verifies the identity token and returns its validated claims.
    ///
    /// Signature, issuer, audience, and time-window checks live behind this
    /// port; the nonce replay check stays with the flow controller so the
    /// read-once property of the stored nonce holds in one place.
    async fn verify(&self, id_token: &str) -> AuthResult<IdentityClaims>;
}

/// Port for the provider userinfo endpoint.
///
/// Strictly best-effort enrichment: any failure yields `None` and the login
/// continues with claims-only data.
#[async_trait]
pub trait UserInfoFetcher: Send + Sync {
    /// Fetches identity attributes with the given access token.
    async fn fetch(&self, access_token: &str) -> Option<UserInfo>;
}
