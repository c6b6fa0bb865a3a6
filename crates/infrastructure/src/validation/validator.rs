//! Identity token validation.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use portal_application::ports::IdTokenVerifier;
use portal_domain::{AuthError, AuthResult, IdentityClaims, OidcConfig};
use tracing::debug;

use crate::validation::jwks::JwksCache;

/// Clock skew tolerated for `exp`, `nbf` and `iat`, in seconds.
const LEEWAY_SECS: u64 = 60;

/// How identity tokens are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Verify the RS256 signature against the provider JWKS. Production mode.
    #[default]
    VerifySignature,
    /// Claims checks only, no signature verification. Explicitly weaker;
    /// only for offline development against captured tokens.
    DecodeOnly,
}

/// Validates identity tokens: signature, audience, expiry, and issuer
/// against an explicit allow-set derived from the configured issuer.
pub struct IdentityTokenValidator {
    mode: ValidationMode,
    client_id: String,
    accepted_issuers: Vec<String>,
    jwks: JwksCache,
}

impl IdentityTokenValidator {
    /// Creates a validator for the configured provider.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &OidcConfig, mode: ValidationMode) -> Self {
        Self {
            mode,
            client_id: config.client_id.clone(),
            accepted_issuers: Self::accepted_issuers(&config.issuer),
            jwks: JwksCache::new(http, config.jwks_url.clone()),
        }
    }

    /// The issuer allow-set: the configured issuer plus the `/oidc`
    /// path variants some provider deployments publish in their tokens.
    fn accepted_issuers(issuer: &str) -> Vec<String> {
        let base = issuer.trim_end_matches('/');
        vec![
            base.to_string(),
            format!("{base}/oidc"),
            format!("{base}/oidc/v1"),
            format!("{base}/oidc/v2"),
        ]
    }

    fn issuer_accepted(&self, iss: &str) -> bool {
        let iss = iss.trim_end_matches('/');
        self.accepted_issuers.iter().any(|a| a == iss)
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = LEEWAY_SECS;
        validation.validate_nbf = true;
        validation.set_audience(&[&self.client_id]);
        validation.set_required_spec_claims(&["exp", "aud"]);
        validation
    }

    fn check_claims(&self, claims: &IdentityClaims) -> AuthResult<()> {
        if !self.issuer_accepted(&claims.iss) {
            return Err(AuthError::TokenValidation {
                message: format!("issuer not accepted: {}", claims.iss),
            });
        }

        #[allow(clippy::cast_possible_wrap)]
        let not_after = chrono::Utc::now().timestamp() + LEEWAY_SECS as i64;
        if claims.iat.is_some_and(|iat| iat > not_after) {
            return Err(AuthError::TokenValidation {
                message: "token issued in the future".to_string(),
            });
        }
        Ok(())
    }

    async fn signing_key(&self, kid: Option<&str>) -> AuthResult<DecodingKey> {
        let jwk = self.jwks.key_for(kid).await?;
        let (n, e) = match (&jwk.n, &jwk.e) {
            (Some(n), Some(e)) => (n, e),
            _ => {
                return Err(AuthError::TokenValidation {
                    message: "JWKS key is missing RSA parameters".to_string(),
                });
            }
        };
        DecodingKey::from_rsa_components(n, e).map_err(|e| AuthError::TokenValidation {
            message: format!("invalid JWKS key material: {e}"),
        })
    }
}

#[async_trait]
impl IdTokenVerifier for IdentityTokenValidator {
    async fn verify(&self, id_token: &str) -> AuthResult<IdentityClaims> {
        let header = decode_header(id_token).map_err(|e| AuthError::TokenValidation {
            message: format!("malformed token header: {e}"),
        })?;

        let claims = match self.mode {
            ValidationMode::VerifySignature => {
                if header.alg != Algorithm::RS256 {
                    return Err(AuthError::TokenValidation {
                        message: format!("unexpected algorithm: {:?}", header.alg),
                    });
                }
                let key = self.signing_key(header.kid.as_deref()).await?;
                decode::<IdentityClaims>(id_token, &key, &self.validation(Algorithm::RS256))
                    .map_err(|e| AuthError::TokenValidation {
                        message: e.to_string(),
                    })?
                    .claims
            }
            ValidationMode::DecodeOnly => {
                let mut validation = self.validation(header.alg);
                validation.insecure_disable_signature_validation();
                decode::<IdentityClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)
                    .map_err(|e| AuthError::TokenValidation {
                        message: e.to_string(),
                    })?
                    .claims
            }
        };

        self.check_claims(&claims)?;
        debug!(sub = %claims.sub, "identity token validated");
        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use portal_domain::{DEFAULT_POST_LOGOUT_REDIRECT_URI, DEFAULT_SCOPE};
    use serde_json::json;

    fn config() -> OidcConfig {
        OidcConfig {
            client_id: "portal-client".to_string(),
            client_secret: None,
            redirect_uri: "portalusuariosmobileg12://auth/callback".to_string(),
            authorize_url: "https://auth.example.uy/oidc/v1/authorize".to_string(),
            token_url: "https://auth.example.uy/oidc/v1/token".to_string(),
            userinfo_url: "https://auth.example.uy/oidc/v1/userinfo".to_string(),
            jwks_url: "https://auth.example.uy/oidc/v1/jwks".to_string(),
            logout_url: "https://auth.example.uy/oidc/v1/logout".to_string(),
            issuer: "https://auth.example.uy".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            post_logout_redirect_uri: DEFAULT_POST_LOGOUT_REDIRECT_URI.to_string(),
        }
    }

    fn decode_only() -> IdentityTokenValidator {
        IdentityTokenValidator::new(reqwest::Client::new(), &config(), ValidationMode::DecodeOnly)
    }

    /// Builds an unsigned token the decode-only mode will parse.
    fn token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.c2ln")
    }

    fn valid_payload() -> serde_json::Value {
        json!({
            "sub": "1234567-8",
            "iss": "https://auth.example.uy/oidc/v1",
            "aud": "portal-client",
            "exp": chrono::Utc::now().timestamp() + 600,
            "nombre_completo": "Ana Pérez",
        })
    }

    #[tokio::test]
    async fn decode_only_accepts_a_valid_token() {
        let claims = decode_only().verify(&token(&valid_payload())).await.unwrap();
        assert_eq!(claims.sub, "1234567-8");
        assert_eq!(claims.nombre_completo.as_deref(), Some("Ana Pérez"));
    }

    #[tokio::test]
    async fn decode_only_accepts_array_audiences() {
        let mut payload = valid_payload();
        payload["aud"] = json!(["other", "portal-client"]);
        assert!(decode_only().verify(&token(&payload)).await.is_ok());
    }

    #[tokio::test]
    async fn expired_token_is_rejected_even_without_signature_checks() {
        let mut payload = valid_payload();
        payload["exp"] = json!(chrono::Utc::now().timestamp() - 600);
        let error = decode_only().verify(&token(&payload)).await.unwrap_err();
        assert!(matches!(error, AuthError::TokenValidation { .. }));
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let mut payload = valid_payload();
        payload["aud"] = json!("someone-else");
        assert!(decode_only().verify(&token(&payload)).await.is_err());
    }

    #[tokio::test]
    async fn foreign_issuer_is_rejected() {
        let mut payload = valid_payload();
        payload["iss"] = json!("https://evil.example.com");
        let error = decode_only().verify(&token(&payload)).await.unwrap_err();
        match error {
            AuthError::TokenValidation { message } => {
                assert!(message.contains("issuer not accepted"));
            }
            other => panic!("expected TokenValidation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn issuer_variants_and_trailing_slashes_are_accepted() {
        for iss in [
            "https://auth.example.uy",
            "https://auth.example.uy/",
            "https://auth.example.uy/oidc",
            "https://auth.example.uy/oidc/v1",
            "https://auth.example.uy/oidc/v2/",
        ] {
            let mut payload = valid_payload();
            payload["iss"] = json!(iss);
            assert!(
                decode_only().verify(&token(&payload)).await.is_ok(),
                "issuer {iss} should be accepted"
            );
        }
    }

    #[tokio::test]
    async fn token_not_yet_valid_is_rejected() {
        let mut payload = valid_payload();
        payload["nbf"] = json!(chrono::Utc::now().timestamp() + 3600);
        let error = decode_only().verify(&token(&payload)).await.unwrap_err();
        assert!(matches!(error, AuthError::TokenValidation { .. }));
    }

    #[tokio::test]
    async fn token_issued_in_the_future_is_rejected() {
        let mut payload = valid_payload();
        payload["iat"] = json!(chrono::Utc::now().timestamp() + 3600);
        let error = decode_only().verify(&token(&payload)).await.unwrap_err();
        match error {
            AuthError::TokenValidation { message } => {
                assert!(message.contains("future"));
            }
            other => panic!("expected TokenValidation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn signature_mode_rejects_non_rs256_algorithms() {
        let validator = IdentityTokenValidator::new(
            reqwest::Client::new(),
            &config(),
            ValidationMode::VerifySignature,
        );
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&valid_payload()).unwrap());
        let error = validator
            .verify(&format!("{header}.{body}.c2ln"))
            .await
            .unwrap_err();
        match error {
            AuthError::TokenValidation { message } => {
                assert!(message.contains("unexpected algorithm"));
            }
            other => panic!("expected TokenValidation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_input_is_a_malformed_header() {
        let error = decode_only().verify("not-a-token").await.unwrap_err();
        match error {
            AuthError::TokenValidation { message } => {
                assert!(message.contains("malformed token header"));
            }
            other => panic!("expected TokenValidation, got {other:?}"),
        }
    }
}
