//! Persisted session model.
//!
//! The session is a single JSON blob owned by the session store; readers
//! always get a fresh deserialized copy, never a shared reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the authenticated access came from.
pub const ACCESS_SOURCE: &str = "GUBUY_OIDC";
/// Human-readable access provenance message.
pub const ACCESS_MESSAGE: &str = "Authenticated via GUB.UY ID Uruguay";

/// Authenticated health-portal session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSession {
    /// The authenticated end user.
    pub health_user: SessionUser,
    /// Tokens issued for this session.
    pub tokens: SessionTokens,
    /// Identity attributes extracted from claims/userinfo.
    pub attributes: SessionAttributes,
    /// Provenance of the access grant.
    pub access: AccessInfo,
    /// When the session was created.
    pub issued_at: DateTime<Utc>,
}

/// Identity of the session owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Document/identity number.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Tokens carried by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    /// Identity token from the exchange.
    pub id_token: String,
    /// Access token, when issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Refresh token, when issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry in epoch milliseconds, fixed at assembly time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Identity attributes for display and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttributes {
    /// National document number.
    pub document_number: String,
    /// Email address, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Identity assurance level reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_level: Option<String>,
    /// Issuer of the identity token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Upstream identity provider the user chose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_provider: Option<String>,
}

/// Provenance of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessInfo {
    /// Machine-readable source tag.
    pub source: String,
    /// Human-readable description.
    pub message: String,
}

impl AccessInfo {
    /// Provenance for sessions created through the OIDC login flow.
    #[must_use]
    pub fn oidc() -> Self {
        Self {
            source: ACCESS_SOURCE.to_string(),
            message: ACCESS_MESSAGE.to_string(),
        }
    }
}

impl PortalSession {
    /// True when the session carries an expiry and `now_millis` has reached it.
    #[must_use]
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.tokens
            .expires_at
            .is_some_and(|expires_at| now_millis >= expires_at)
    }
}
