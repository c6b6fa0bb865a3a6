//! Userinfo endpoint client.
//!
//! The userinfo call only enriches the session; every failure here
//! degrades to claims-only data instead of failing the login.

use async_trait::async_trait;
use portal_application::ports::UserInfoFetcher;
use portal_domain::UserInfo;
use tracing::warn;

/// Reqwest-backed [`UserInfoFetcher`].
pub struct UserInfoClient {
    http: reqwest::Client,
    userinfo_url: String,
}

impl UserInfoClient {
    /// Creates a client for the given userinfo endpoint.
    #[must_use]
    pub const fn new(http: reqwest::Client, userinfo_url: String) -> Self {
        Self { http, userinfo_url }
    }
}

#[async_trait]
impl UserInfoFetcher for UserInfoClient {
    async fn fetch(&self, access_token: &str) -> Option<UserInfo> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "userinfo request rejected");
                return None;
            }
            Err(error) => {
                warn!(%error, "userinfo request failed");
                return None;
            }
        };

        match response.json::<UserInfo>().await {
            Ok(info) => Some(info),
            Err(error) => {
                warn!(%error, "userinfo response was not valid JSON");
                None
            }
        }
    }
}
