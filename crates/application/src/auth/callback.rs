//! Deep-link callback URL parsing.

use portal_domain::{AuthError, AuthResult};
use url::Url;

/// Query parameters extracted from a callback URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code, on success.
    pub code: Option<String>,
    /// CSRF state echoed by the provider.
    pub state: Option<String>,
    /// Provider error code, on failure.
    pub error: Option<String>,
    /// Provider error description, on failure.
    pub error_description: Option<String>,
}

/// Parses a callback URL into its query parameters.
///
/// Some platforms deliver the custom scheme with a mangled slash count
/// (`scheme:////auth/callback`); the URL is normalized to the canonical
/// `scheme://` form before parsing.
///
/// # Errors
///
/// Returns [`AuthError::Callback`] when the URL cannot be parsed at all.
pub fn parse_callback_url(raw: &str) -> AuthResult<CallbackParams> {
    let normalized = normalize_scheme(raw);
    let url = Url::parse(&normalized).map_err(|_| AuthError::Callback {
        message: format!("invalid callback URL: {raw}"),
    })?;

    let mut params = CallbackParams::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => params.code = Some(value.into_owned()),
            "state" => params.state = Some(value.into_owned()),
            "error" => params.error = Some(value.into_owned()),
            "error_description" => params.error_description = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(params)
}

/// Collapses any run of slashes after the scheme into exactly two.
fn normalize_scheme(raw: &str) -> String {
    if let Some((scheme, rest)) = raw.split_once(':') {
        let valid_scheme = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '.' | '-'));
        if valid_scheme && rest.starts_with('/') {
            return format!("{scheme}://{}", rest.trim_start_matches('/'));
        }
    }
    raw.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_code_and_state() {
        let params =
            parse_callback_url("portalusuariosmobileg12://auth/callback?code=ABC&state=S1")
                .unwrap();
        assert_eq!(params.code.as_deref(), Some("ABC"));
        assert_eq!(params.state.as_deref(), Some("S1"));
        assert_eq!(params.error, None);
    }

    #[test]
    fn normalizes_extra_slashes_after_scheme() {
        let params =
            parse_callback_url("portalusuariosmobileg12:////auth/callback?code=X&state=Y")
                .unwrap();
        assert_eq!(params.code.as_deref(), Some("X"));
        assert_eq!(params.state.as_deref(), Some("Y"));
    }

    #[test]
    fn https_urls_pass_through_unchanged() {
        let params =
            parse_callback_url("https://localhost:8080/callback?code=K&state=T").unwrap();
        assert_eq!(params.code.as_deref(), Some("K"));
        assert_eq!(params.state.as_deref(), Some("T"));
    }

    #[test]
    fn extracts_provider_error() {
        let params = parse_callback_url(
            "portalusuariosmobileg12://auth/callback?error=access_denied&error_description=denied",
        )
        .unwrap();
        assert_eq!(params.error.as_deref(), Some("access_denied"));
        assert_eq!(params.error_description.as_deref(), Some("denied"));
        assert_eq!(params.code, None);
    }

    #[test]
    fn unparseable_url_is_a_callback_error() {
        let err = parse_callback_url("not a url").unwrap_err();
        assert!(matches!(err, AuthError::Callback { .. }));
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let params = parse_callback_url(
            "portalusuariosmobileg12://auth/callback?error=access_denied&error_description=User%20denied%20access",
        )
        .unwrap();
        assert_eq!(
            params.error_description.as_deref(),
            Some("User denied access")
        );
    }
}
