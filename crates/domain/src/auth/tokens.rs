//! Token endpoint response types.

use serde::{Deserialize, Serialize};

/// Token set obtained from the provider token endpoint.
///
/// Immutable once received. `expires_in` is converted to an absolute
/// timestamp exactly once, at session-assembly time, so clock drift never
/// changes the recorded expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Signed identity token. Mandatory: an exchange response without one
    /// is rejected.
    pub id_token: String,
    /// Access token for the userinfo endpoint.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Refresh token, when the provider issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Lifetime in seconds relative to issuance.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Scopes actually granted.
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Absolute expiry in epoch milliseconds given the current time.
    #[must_use]
    pub fn expires_at_millis(&self, now_millis: i64) -> Option<i64> {
        self.expires_in.map(|secs| {
            let millis = i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000);
            now_millis.saturating_add(millis)
        })
    }
}
