//! HTTP clients for the provider endpoints.

pub mod token_client;
pub mod userinfo_client;

pub use token_client::TokenClient;
pub use userinfo_client::UserInfoClient;

/// Builds the shared HTTP client.
///
/// Redirects are disabled: the token endpoint must answer directly and a
/// redirecting provider would leak the authorization code.
///
/// # Errors
///
/// Returns the builder error when the TLS backend cannot be initialized;
/// there is no usable fallback client without the redirect policy.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
