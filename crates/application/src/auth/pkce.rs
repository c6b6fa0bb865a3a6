//! PKCE and CSRF/replay value generation.
//!
//! Produces the four per-attempt values of the authorization code flow:
//! code verifier, S256 code challenge, state, and nonce. All randomness
//! comes from the thread-local CSPRNG; encoding is base64url without
//! padding throughout.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes behind the code verifier (86 encoded chars, ≥43 required).
const VERIFIER_BYTES: usize = 64;

/// Random bytes behind the state and nonce values.
const TOKEN_BYTES: usize = 32;

/// PKCE challenge method sent to the provider.
pub const CHALLENGE_METHOD: &str = "S256";

/// One login attempt's worth of freshly generated values.
///
/// Never reuse these across attempts: a failed attempt's artifacts are
/// discarded and the whole set regenerated.
#[derive(Debug, Clone)]
pub struct PkceAttempt {
    /// Secret verifier, sent only in the token exchange.
    pub code_verifier: String,
    /// `base64url(SHA-256(code_verifier))`, sent in the authorization URL.
    pub code_challenge: String,
    /// CSRF token round-tripped through the redirect.
    pub state: String,
    /// Replay token echoed inside the identity token claims.
    pub nonce: String,
}

impl PkceAttempt {
    /// Generates a fresh verifier/challenge pair plus state and nonce.
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = random_urlsafe(VERIFIER_BYTES);
        let code_challenge = compute_challenge(&code_verifier);
        Self {
            code_verifier,
            code_challenge,
            state: random_urlsafe(TOKEN_BYTES),
            nonce: random_urlsafe(TOKEN_BYTES),
        }
    }
}

/// S256 code challenge for a verifier.
#[must_use]
pub fn compute_challenge(code_verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes()))
}

/// `len` CSPRNG bytes, base64url-encoded without padding.
fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(&bytes)
}
