//! Authorization code flow controller.
//!
//! Orchestrates one login attempt end to end: PKCE generation, ephemeral
//! storage, the browser/deep-link race, callback validation, token
//! exchange, identity token verification, and session assembly. Ephemeral
//! cleanup runs from a single finalization point on every exit path.

use std::sync::Arc;
use std::time::Duration;

use portal_domain::{
    AccessInfo, AuthError, AuthResult, IdentityClaims, OidcConfig, PortalSession,
    SessionAttributes, SessionTokens, SessionUser, TokenSet, UserInfo,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::callback::parse_callback_url;
use crate::auth::exchange_store::ExchangeStore;
use crate::auth::pkce::{self, PkceAttempt};
use crate::ports::{
    AuthBrowser, BrowserOutcome, Clock, DeepLinkSource, IdTokenVerifier, SecureStore,
    TokenExchanger, UserInfoFetcher,
};
use crate::session::SessionStore;

/// How long the flow waits for a deep link after the browser session is
/// dismissed without a usable result.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// External collaborators of the flow, injected by the host shell and the
/// infrastructure layer.
pub struct FlowAdapters {
    /// Browser session integration.
    pub browser: Arc<dyn AuthBrowser>,
    /// OS deep-link event source.
    pub deep_links: Arc<dyn DeepLinkSource>,
    /// Token endpoint client.
    pub token_client: Arc<dyn TokenExchanger>,
    /// Identity token validator.
    pub verifier: Arc<dyn IdTokenVerifier>,
    /// Userinfo endpoint client (best-effort).
    pub userinfo: Arc<dyn UserInfoFetcher>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

/// The login/logout use case.
///
/// Only this controller writes ephemeral values, and only its session
/// assembly writes the session. A second concurrent attempt is rejected
/// rather than allowed to overwrite in-flight artifacts.
pub struct LoginFlow {
    config: OidcConfig,
    exchange: ExchangeStore,
    sessions: SessionStore,
    adapters: FlowAdapters,
    attempt_guard: Mutex<()>,
}

impl LoginFlow {
    /// Builds the flow over a secure store and adapter set.
    ///
    /// # Errors
    ///
    /// Fails fast with [`AuthError::Configuration`] when a required setting
    /// is missing, before any network traffic.
    pub fn new(
        config: OidcConfig,
        store: Arc<dyn SecureStore>,
        adapters: FlowAdapters,
    ) -> AuthResult<Self> {
        config.validate()?;
        let exchange = ExchangeStore::new(store.clone());
        let sessions = SessionStore::new(store, adapters.clock.clone());
        Ok(Self {
            config,
            exchange,
            sessions,
            adapters,
            attempt_guard: Mutex::new(()),
        })
    }

    /// The session store backing this flow.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs one complete login attempt.
    ///
    /// # Errors
    ///
    /// See [`AuthError`]; every failure path has already cleaned up the
    /// ephemeral storage when it reaches the caller.
    pub async fn login(&self) -> AuthResult<PortalSession> {
        let _guard = self
            .attempt_guard
            .try_lock()
            .map_err(|_| AuthError::AttemptInProgress)?;

        let result = self.run_attempt().await;
        // Single finalization point: secrets never outlive the attempt,
        // success included.
        self.exchange.cleanup().await;

        match &result {
            Ok(session) => info!(user = %session.health_user.id, "login succeeded"),
            Err(error) => warn!(%error, "login attempt failed"),
        }
        result
    }

    /// Completes a login from an externally delivered callback URL, for
    /// hosts that receive the deep link on a cold start.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::login`].
    pub async fn complete_login(&self, callback_url: &str) -> AuthResult<PortalSession> {
        let _guard = self
            .attempt_guard
            .try_lock()
            .map_err(|_| AuthError::AttemptInProgress)?;

        let result = self.process_callback(callback_url).await;
        self.exchange.cleanup().await;
        result
    }

    /// Logs out: clears the local session and ephemeral values first, then
    /// best-effort opens the provider end-session endpoint.
    ///
    /// # Errors
    ///
    /// Propagates only local storage failures; the remote step is swallowed
    /// because local logout is authoritative.
    pub async fn logout(&self) -> AuthResult<()> {
        let session = self.sessions.get().await;
        self.sessions.clear().await?;
        self.exchange.cleanup().await;

        if let Some(session) = session {
            match self.logout_url(&session.tokens.id_token) {
                Ok(url) => {
                    if let Err(error) = self.adapters.browser.open_url(&url).await {
                        warn!(%error, "failed to open end-session endpoint");
                    }
                }
                Err(error) => warn!(%error, "failed to build end-session URL"),
            }
        }
        Ok(())
    }

    async fn run_attempt(&self) -> AuthResult<PortalSession> {
        let attempt = PkceAttempt::generate();
        self.exchange.store_attempt(&attempt).await?;

        let auth_url = self.authorization_url(&attempt)?;
        let scheme = self.config.callback_scheme()?;
        debug!(%auth_url, "opening browser authentication session");

        // The deep-link wait and the browser session race; whichever yields
        // a usable callback URL first wins and the loser is dropped.
        let deep_link = self.adapters.deep_links.wait_for_callback(&scheme);
        tokio::pin!(deep_link);
        let browser = self
            .adapters
            .browser
            .open_auth_session(&auth_url, &self.config.redirect_uri);
        tokio::pin!(browser);

        let callback_url = tokio::select! {
            outcome = &mut browser => match outcome? {
                BrowserOutcome::Success { url } => url,
                BrowserOutcome::Cancelled => return Err(AuthError::UserCancelled),
                BrowserOutcome::Dismissed => {
                    // Some platforms report "dismissed" even though the
                    // redirect fired; the deep link is still coming.
                    debug!("browser session dismissed, waiting for deep link");
                    match tokio::time::timeout(CALLBACK_TIMEOUT, &mut deep_link).await {
                        Ok(url) => url,
                        Err(_) => return Err(AuthError::Timeout),
                    }
                }
                BrowserOutcome::Other(kind) => {
                    return Err(AuthError::AuthenticationFailed(kind));
                }
            },
            url = &mut deep_link => url,
        };

        self.process_callback(&callback_url).await
    }

    async fn process_callback(&self, callback_url: &str) -> AuthResult<PortalSession> {
        let params = parse_callback_url(callback_url)?;

        if let Some(error) = params.error {
            return Err(AuthError::Callback {
                message: params.error_description.unwrap_or(error),
            });
        }

        let (code, state) = match (params.code, params.state) {
            (Some(code), Some(state)) => (code, state),
            _ => {
                return Err(AuthError::Callback {
                    message: "no authorization code received".to_string(),
                });
            }
        };

        // CSRF gate: must pass before any network call.
        let stored_state = self.exchange.take_state().await?;
        if stored_state.as_deref() != Some(state.as_str()) {
            return Err(AuthError::Csrf);
        }

        let code_verifier = self
            .exchange
            .take_verifier()
            .await?
            .ok_or_else(|| AuthError::AuthenticationFailed("code verifier not found".to_string()))?;

        let tokens = self
            .adapters
            .token_client
            .exchange_code(&code, &code_verifier)
            .await?;

        let claims = self.adapters.verifier.verify(&tokens.id_token).await?;

        // Replay gate: the stored nonce is read-once, so a second token
        // carrying the same nonce can never validate.
        let stored_nonce = self.exchange.take_nonce().await?;
        if stored_nonce.is_none() || claims.nonce != stored_nonce {
            return Err(AuthError::TokenValidation {
                message: "nonce mismatch - possible replay attack".to_string(),
            });
        }

        let userinfo = match tokens.access_token.as_deref() {
            Some(access_token) => self.adapters.userinfo.fetch(access_token).await,
            None => None,
        };

        let session = self.assemble_session(&claims, userinfo.as_ref(), &tokens);
        self.sessions.store(&session).await?;
        Ok(session)
    }

    fn assemble_session(
        &self,
        claims: &IdentityClaims,
        userinfo: Option<&UserInfo>,
        tokens: &TokenSet,
    ) -> PortalSession {
        let document_number = claims.document_number(userinfo);
        let full_name = claims.full_name(userinfo);
        let now = self.adapters.clock.now();

        PortalSession {
            health_user: SessionUser {
                id: document_number.clone(),
                name: full_name,
            },
            tokens: SessionTokens {
                id_token: tokens.id_token.clone(),
                access_token: tokens.access_token.clone(),
                refresh_token: tokens.refresh_token.clone(),
                // Fixed once here; never recomputed, so later clock drift
                // cannot move the expiry.
                expires_at: tokens.expires_at_millis(now.timestamp_millis()),
            },
            attributes: SessionAttributes {
                document_number,
                email: userinfo
                    .and_then(|u| u.email.clone())
                    .or_else(|| claims.email.clone()),
                identity_level: userinfo
                    .and_then(|u| u.nid.clone())
                    .or_else(|| claims.nid.clone()),
                issuer: Some(claims.iss.clone()),
                identity_provider: userinfo
                    .and_then(|u| u.idp.clone())
                    .or_else(|| claims.idp.clone()),
            },
            access: AccessInfo::oidc(),
            issued_at: now,
        }
    }

    fn authorization_url(&self, attempt: &PkceAttempt) -> AuthResult<String> {
        let mut url = Url::parse(&self.config.authorize_url)
            .map_err(|_| AuthError::Configuration("authorize_url".to_string()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("state", &attempt.state)
            .append_pair("code_challenge", &attempt.code_challenge)
            .append_pair("code_challenge_method", pkce::CHALLENGE_METHOD)
            .append_pair("nonce", &attempt.nonce);
        Ok(url.into())
    }

    fn logout_url(&self, id_token: &str) -> AuthResult<String> {
        let mut url = Url::parse(&self.config.logout_url)
            .map_err(|_| AuthError::Configuration("logout_url".to_string()))?;
        url.query_pairs_mut()
            .append_pair("id_token_hint", id_token)
            .append_pair(
                "post_logout_redirect_uri",
                &self.config.post_logout_redirect_uri,
            );
        Ok(url.into())
    }
}
