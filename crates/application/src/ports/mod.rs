//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external
//! systems. Each port is a trait that can be implemented by adapters in the
//! infrastructure layer or by the host shell.

mod browser;
mod clock;
mod deep_link;
mod gateway;
mod secure_store;

pub use browser::{AuthBrowser, BrowserOutcome};
pub use clock::Clock;
pub use deep_link::DeepLinkSource;
pub use gateway::{IdTokenVerifier, TokenExchanger, UserInfoFetcher};
pub use secure_store::SecureStore;
