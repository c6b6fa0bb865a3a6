//! Identity token claims and userinfo payloads.
//!
//! These types give the loosely-shaped provider JSON an explicit schema at
//! the boundary. Claims are consumed once to assemble a session and are
//! never persisted on their own.

use serde::{Deserialize, Serialize};

/// `aud` claim: the provider emits either a single string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience value.
    Single(String),
    /// Multiple audience values.
    Multiple(Vec<String>),
}

impl Audience {
    /// True when the audience equals or contains `client_id`.
    #[must_use]
    pub fn contains(&self, client_id: &str) -> bool {
        match self {
            Self::Single(aud) => aud == client_id,
            Self::Multiple(auds) => auds.iter().any(|a| a == client_id),
        }
    }
}

/// Decoded identity token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject identifier.
    pub sub: String,
    /// Issuer URL.
    pub iss: String,
    /// Audience(s) the token was issued for.
    pub aud: Audience,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Not-before, seconds since epoch.
    #[serde(default)]
    pub nbf: Option<i64>,
    /// Issued-at, seconds since epoch.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Replay-protection nonce echoed from the authorization request.
    #[serde(default)]
    pub nonce: Option<String>,
    /// National document number claim.
    #[serde(default)]
    pub numero_documento: Option<String>,
    /// Legacy user identifier claim.
    #[serde(default)]
    pub uid: Option<String>,
    /// Full display name claim.
    #[serde(default)]
    pub nombre_completo: Option<String>,
    /// Standard OIDC name claim.
    #[serde(default)]
    pub name: Option<String>,
    /// Email claim.
    #[serde(default)]
    pub email: Option<String>,
    /// Identity assurance level.
    #[serde(default)]
    pub nid: Option<String>,
    /// Identity provider the user authenticated with.
    #[serde(default)]
    pub idp: Option<String>,
}

/// Userinfo endpoint payload, used only as best-effort enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// National document number.
    #[serde(default)]
    pub numero_documento: Option<String>,
    /// Full display name.
    #[serde(default)]
    pub nombre_completo: Option<String>,
    /// Given name.
    #[serde(default)]
    pub given_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub family_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Identity assurance level.
    #[serde(default)]
    pub nid: Option<String>,
    /// Identity provider the user authenticated with.
    #[serde(default)]
    pub idp: Option<String>,
}

impl IdentityClaims {
    /// Document/identity number with the defined fallback order:
    /// userinfo claim, token claim, legacy `uid`, `sub`, generic fallback.
    #[must_use]
    pub fn document_number(&self, userinfo: Option<&UserInfo>) -> String {
        userinfo
            .and_then(|u| u.numero_documento.clone())
            .or_else(|| self.numero_documento.clone())
            .or_else(|| self.uid.clone())
            .or_else(|| non_empty(&self.sub))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Display name with the defined fallback order, bottoming out at the
    /// document number so sessions always carry a non-empty name.
    #[must_use]
    pub fn full_name(&self, userinfo: Option<&UserInfo>) -> String {
        userinfo
            .and_then(|u| u.nombre_completo.clone())
            .or_else(|| self.nombre_completo.clone())
            .or_else(|| userinfo.and_then(UserInfo::composed_name))
            .or_else(|| self.name.clone())
            .or_else(|| userinfo.and_then(|u| u.email.clone()))
            .unwrap_or_else(|| self.document_number(userinfo))
    }
}

impl UserInfo {
    /// "given family" when at least one of the two parts is present.
    #[must_use]
    pub fn composed_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
