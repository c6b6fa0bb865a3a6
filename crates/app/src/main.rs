//! Health portal authentication CLI.
//!
//! Commands: `login` (default), `logout`, `status`.

mod shell;

use std::sync::Arc;

use portal_application::{FlowAdapters, LoginFlow};
use portal_infrastructure::{
    DiscoveryClient, FileSecureStore, IdentityTokenValidator, SystemClock, TokenClient,
    UserInfoClient, ValidationMode, build_client, load_from_env, resolve_endpoints,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::shell::{NoDeepLinks, StdioBrowser};

fn validation_mode() -> ValidationMode {
    match std::env::var("OIDC_VALIDATION_MODE").ok().as_deref() {
        Some("decode-only") => {
            tracing::warn!("signature verification is DISABLED (decode-only mode)");
            ValidationMode::DecodeOnly
        }
        _ => ValidationMode::VerifySignature,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "login".to_string());

    let mut config = load_from_env();
    let http = build_client()?;
    let discovery = DiscoveryClient::new(http.clone(), config.issuer.clone());
    resolve_endpoints(&mut config, &discovery).await?;

    let validator = IdentityTokenValidator::new(http.clone(), &config, validation_mode());
    let adapters = FlowAdapters {
        browser: Arc::new(StdioBrowser),
        deep_links: Arc::new(NoDeepLinks),
        token_client: Arc::new(TokenClient::new(http.clone(), config.clone())),
        verifier: Arc::new(validator),
        userinfo: Arc::new(UserInfoClient::new(http, config.userinfo_url.clone())),
        clock: Arc::new(SystemClock::new()),
    };
    let store = Arc::new(FileSecureStore::new(FileSecureStore::default_path()));
    let flow = LoginFlow::new(config, store, adapters)?;

    match command.as_str() {
        "login" => {
            let session = flow.login().await?;
            println!(
                "Signed in as {} ({})",
                session.health_user.name, session.attributes.document_number
            );
        }
        "logout" => {
            flow.logout().await?;
            println!("Signed out.");
        }
        "status" => match flow.sessions().get().await {
            Some(session) => println!(
                "Signed in as {} ({})",
                session.health_user.name, session.attributes.document_number
            ),
            None => println!("Not signed in."),
        },
        other => {
            eprintln!("unknown command: {other}");
            eprintln!("usage: portal-auth [login|logout|status]");
            std::process::exit(2);
        }
    }

    Ok(())
}
