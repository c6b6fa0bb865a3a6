//! Portal Application - Authentication use cases
//!
//! This crate orchestrates the authorization code flow over ports; all
//! I/O (browser, deep links, HTTP, storage) is behind trait objects
//! implemented by the infrastructure layer.

pub mod auth;
pub mod ports;
pub mod session;

#[cfg(test)]
mod test_support;

pub use auth::{CALLBACK_TIMEOUT, ExchangeStore, FlowAdapters, LoginFlow, PkceAttempt};
pub use session::SessionStore;
