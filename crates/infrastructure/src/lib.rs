//! Portal Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: HTTP clients for the provider
//! endpoints, the identity token validator, the file-backed secure
//! store, and the system clock.

pub mod adapters;
pub mod config;
pub mod http;
pub mod persistence;
pub mod validation;

pub use adapters::SystemClock;
pub use config::{load_from_env, resolve_endpoints};
pub use http::{TokenClient, UserInfoClient, build_client};
pub use persistence::FileSecureStore;
pub use validation::{DiscoveryClient, IdentityTokenValidator, JwksCache, ValidationMode};
