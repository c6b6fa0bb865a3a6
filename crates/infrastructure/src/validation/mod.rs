//! Identity token validation: JWKS cache, discovery, and the validator.

pub mod discovery;
pub mod jwks;
pub mod validator;

pub use discovery::{DiscoveryClient, DiscoveryDocument};
pub use jwks::{Jwk, JwksCache};
pub use validator::{IdentityTokenValidator, ValidationMode};
