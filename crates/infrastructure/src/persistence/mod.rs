//! Storage adapters.

pub mod file_store;

pub use file_store::FileSecureStore;
