//! Session persistence with expiry-on-read.

pub mod store;

pub use store::SessionStore;
