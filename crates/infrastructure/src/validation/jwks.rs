//! JWKS fetching and caching.

use std::time::{Duration, Instant};

use portal_domain::{AuthError, AuthResult};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// How long a fetched key set stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(600);

/// Minimum gap between forced refreshes triggered by an unknown `kid`.
pub const REFETCH_COOLDOWN: Duration = Duration::from_secs(30);

/// A single JSON Web Key. Only RSA signing keys are used.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type, e.g. `RSA`.
    pub kty: String,
    /// Key identifier matched against the token header.
    #[serde(default)]
    pub kid: Option<String>,
    /// Intended use, e.g. `sig`.
    #[serde(default)]
    pub r#use: Option<String>,
    /// RSA modulus, base64url.
    #[serde(default)]
    pub n: Option<String>,
    /// RSA exponent, base64url.
    #[serde(default)]
    pub e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

struct CacheState {
    keys: Option<Vec<Jwk>>,
    fetched_at: Option<Instant>,
    last_attempt: Option<Instant>,
}

/// Cached JWKS endpoint reader.
///
/// A fetch error clears the cached set, so the next lookup retries instead
/// of serving stale keys forever. Unknown-`kid` lookups force a refresh at
/// most once per [`REFETCH_COOLDOWN`].
pub struct JwksCache {
    http: reqwest::Client,
    jwks_url: String,
    state: Mutex<CacheState>,
}

impl JwksCache {
    /// Creates an empty cache for the given endpoint.
    #[must_use]
    pub fn new(http: reqwest::Client, jwks_url: String) -> Self {
        Self {
            http,
            jwks_url,
            state: Mutex::new(CacheState {
                keys: None,
                fetched_at: None,
                last_attempt: None,
            }),
        }
    }

    /// Returns the key matching `kid`.
    ///
    /// A token without a `kid` is accepted only when the set holds exactly
    /// one key.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenValidation`] when the endpoint is unreachable or no
    /// key matches.
    pub async fn key_for(&self, kid: Option<&str>) -> AuthResult<Jwk> {
        let mut state = self.state.lock().await;

        let fresh = state
            .fetched_at
            .is_some_and(|at| at.elapsed() < CACHE_TTL);
        if !fresh || state.keys.is_none() {
            Self::refresh(&self.http, &self.jwks_url, &mut state).await?;
        }

        if let Some(key) = Self::select(state.keys.as_deref().unwrap_or_default(), kid) {
            return Ok(key);
        }

        // Unknown kid usually means the provider rotated keys under us.
        let cooled = state
            .last_attempt
            .is_none_or(|at| at.elapsed() >= REFETCH_COOLDOWN);
        if cooled {
            debug!(?kid, "signing key not cached, forcing JWKS refresh");
            Self::refresh(&self.http, &self.jwks_url, &mut state).await?;
            if let Some(key) = Self::select(state.keys.as_deref().unwrap_or_default(), kid) {
                return Ok(key);
            }
        }

        Err(AuthError::TokenValidation {
            message: "no matching signing key in JWKS".to_string(),
        })
    }

    fn select(keys: &[Jwk], kid: Option<&str>) -> Option<Jwk> {
        let rsa: Vec<&Jwk> = keys
            .iter()
            .filter(|k| k.kty == "RSA" && k.r#use.as_deref() != Some("enc"))
            .collect();
        match kid {
            Some(kid) => rsa.iter().find(|k| k.kid.as_deref() == Some(kid)).copied(),
            None if rsa.len() == 1 => Some(rsa[0]),
            None => None,
        }
        .cloned()
    }

    async fn refresh(
        http: &reqwest::Client,
        jwks_url: &str,
        state: &mut CacheState,
    ) -> AuthResult<()> {
        state.last_attempt = Some(Instant::now());
        match Self::fetch(http, jwks_url).await {
            Ok(keys) => {
                debug!(count = keys.len(), "JWKS refreshed");
                state.keys = Some(keys);
                state.fetched_at = Some(Instant::now());
                Ok(())
            }
            Err(error) => {
                // Error reset: never keep a set we failed to revalidate.
                warn!(%error, "JWKS fetch failed");
                state.keys = None;
                state.fetched_at = None;
                Err(error)
            }
        }
    }

    async fn fetch(http: &reqwest::Client, jwks_url: &str) -> AuthResult<Vec<Jwk>> {
        let response = http
            .get(jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::TokenValidation {
                message: format!("JWKS fetch failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(AuthError::TokenValidation {
                message: format!("JWKS endpoint returned {}", response.status()),
            });
        }

        let document: JwksDocument =
            response.json().await.map_err(|e| AuthError::TokenValidation {
                message: format!("invalid JWKS document: {e}"),
            })?;
        Ok(document.keys)
    }
}
