//! Shared doubles for unit tests: in-memory secure store, settable clock,
//! and scripted port implementations.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs
)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use portal_domain::{
    AccessInfo, AuthResult, Audience, IdentityClaims, OAUTH_NONCE_KEY, OAUTH_STATE_KEY,
    PortalSession, SessionAttributes, SessionTokens, SessionUser, TokenSet, UserInfo,
};
use tokio::sync::{Mutex, RwLock};

use crate::ports::{
    AuthBrowser, BrowserOutcome, Clock, DeepLinkSource, IdTokenVerifier, SecureStore,
    TokenExchanger, UserInfoFetcher,
};

/// In-memory [`SecureStore`].
#[derive(Default)]
pub struct MemorySecureStore {
    values: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// Settable [`Clock`].
pub struct MockClock(AtomicI64);

impl MockClock {
    pub fn at_millis(millis: i64) -> Self {
        Self(AtomicI64::new(millis))
    }

    pub fn set_millis(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0.load(Ordering::SeqCst))
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// A session for storage tests.
pub fn sample_session(expires_at: Option<i64>) -> PortalSession {
    PortalSession {
        health_user: SessionUser {
            id: "1234567-8".to_string(),
            name: "Ana Pérez".to_string(),
        },
        tokens: SessionTokens {
            id_token: "header.payload.signature".to_string(),
            access_token: Some("access".to_string()),
            refresh_token: None,
            expires_at,
        },
        attributes: SessionAttributes {
            document_number: "1234567-8".to_string(),
            email: None,
            identity_level: None,
            issuer: Some("https://auth.example.uy/oidc/v1".to_string()),
            identity_provider: None,
        },
        access: AccessInfo::oidc(),
        issued_at: Utc.timestamp_millis_opt(0).single().unwrap(),
    }
}

/// What a [`ScriptedBrowser`] does when the auth session opens.
#[derive(Clone)]
pub enum BrowserScript {
    /// Return `Success` with a callback carrying `code` and the state
    /// currently stored in the exchange store.
    SucceedWithStoredState {
        store: Arc<MemorySecureStore>,
        code: String,
    },
    /// Return this outcome as-is.
    Fixed(BrowserOutcome),
    /// Never resolve (the deep link must win the race).
    NeverResolves,
}

/// Scripted [`AuthBrowser`] that records every URL it is asked to open.
pub struct ScriptedBrowser {
    script: Mutex<BrowserScript>,
    pub auth_urls: Mutex<Vec<String>>,
    pub opened_urls: Mutex<Vec<String>>,
}

impl ScriptedBrowser {
    pub fn new(script: BrowserScript) -> Self {
        Self {
            script: Mutex::new(script),
            auth_urls: Mutex::new(Vec::new()),
            opened_urls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AuthBrowser for ScriptedBrowser {
    async fn open_auth_session(
        &self,
        auth_url: &str,
        _redirect_uri: &str,
    ) -> AuthResult<BrowserOutcome> {
        self.auth_urls.lock().await.push(auth_url.to_string());
        let script = self.script.lock().await.clone();
        match script {
            BrowserScript::SucceedWithStoredState { store, code } => {
                let state = store.get(OAUTH_STATE_KEY).await?.unwrap_or_default();
                Ok(BrowserOutcome::Success {
                    url: format!(
                        "portalusuariosmobileg12://auth/callback?code={code}&state={state}"
                    ),
                })
            }
            BrowserScript::Fixed(outcome) => Ok(outcome),
            BrowserScript::NeverResolves => std::future::pending().await,
        }
    }

    async fn open_url(&self, url: &str) -> AuthResult<()> {
        self.opened_urls.lock().await.push(url.to_string());
        Ok(())
    }
}

/// Scripted [`DeepLinkSource`].
pub enum DeepLinkScript {
    /// Deliver a callback carrying `code` and the currently stored state.
    ValidFromStore {
        store: Arc<MemorySecureStore>,
        code: String,
    },
    /// Deliver this URL as-is.
    Fixed(String),
    /// No deep link ever arrives.
    Never,
}

pub struct StubDeepLink {
    script: DeepLinkScript,
}

impl StubDeepLink {
    pub fn new(script: DeepLinkScript) -> Self {
        Self { script }
    }
}

#[async_trait]
impl DeepLinkSource for StubDeepLink {
    async fn wait_for_callback(&self, scheme: &str) -> String {
        match &self.script {
            DeepLinkScript::ValidFromStore { store, code } => {
                let state = store
                    .get(OAUTH_STATE_KEY)
                    .await
                    .ok()
                    .flatten()
                    .unwrap_or_default();
                format!("{scheme}://auth/callback?code={code}&state={state}")
            }
            DeepLinkScript::Fixed(url) => url.clone(),
            DeepLinkScript::Never => std::future::pending().await,
        }
    }
}

/// Stub [`TokenExchanger`] recording each call.
pub struct StubExchanger {
    response: Mutex<AuthResult<TokenSet>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl StubExchanger {
    pub fn returning(response: AuthResult<TokenSet>) -> Self {
        Self {
            response: Mutex::new(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn tokens(expires_in: Option<u64>) -> TokenSet {
        TokenSet {
            id_token: "header.payload.signature".to_string(),
            access_token: Some("access-token".to_string()),
            refresh_token: Some("refresh-token".to_string()),
            token_type: "Bearer".to_string(),
            expires_in,
            scope: None,
        }
    }
}

#[async_trait]
impl TokenExchanger for StubExchanger {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> AuthResult<TokenSet> {
        self.calls
            .lock()
            .await
            .push((code.to_string(), code_verifier.to_string()));
        self.response.lock().await.clone()
    }
}

/// Stub [`IdTokenVerifier`].
pub enum VerifierScript {
    /// Succeed with claims whose nonce mirrors the currently stored nonce.
    EchoStoredNonce { store: Arc<MemorySecureStore> },
    /// Succeed with claims carrying a nonce that cannot match.
    WrongNonce,
    /// Fail with this error.
    Fail(portal_domain::AuthError),
}

pub struct StubVerifier {
    script: VerifierScript,
}

impl StubVerifier {
    pub fn new(script: VerifierScript) -> Self {
        Self { script }
    }

    pub fn base_claims() -> IdentityClaims {
        IdentityClaims {
            sub: "1234567-8".to_string(),
            iss: "https://auth.example.uy/oidc/v1".to_string(),
            aud: Audience::Single("portal-client".to_string()),
            exp: 4_000_000_000,
            nbf: None,
            iat: None,
            nonce: None,
            numero_documento: None,
            uid: None,
            nombre_completo: Some("Ana Pérez".to_string()),
            name: None,
            email: Some("ana@example.uy".to_string()),
            nid: None,
            idp: None,
        }
    }
}

#[async_trait]
impl IdTokenVerifier for StubVerifier {
    async fn verify(&self, _id_token: &str) -> AuthResult<IdentityClaims> {
        match &self.script {
            VerifierScript::EchoStoredNonce { store } => {
                let mut claims = Self::base_claims();
                claims.nonce = store.get(OAUTH_NONCE_KEY).await.ok().flatten();
                Ok(claims)
            }
            VerifierScript::WrongNonce => {
                let mut claims = Self::base_claims();
                claims.nonce = Some("not-the-stored-nonce".to_string());
                Ok(claims)
            }
            VerifierScript::Fail(error) => Err(error.clone()),
        }
    }
}

/// Stub [`UserInfoFetcher`].
pub struct StubUserInfo {
    info: Option<UserInfo>,
    pub calls: Mutex<Vec<String>>,
}

impl StubUserInfo {
    pub fn returning(info: Option<UserInfo>) -> Self {
        Self {
            info,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserInfoFetcher for StubUserInfo {
    async fn fetch(&self, access_token: &str) -> Option<UserInfo> {
        self.calls.lock().await.push(access_token.to_string());
        self.info.clone()
    }
}
