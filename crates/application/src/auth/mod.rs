//! Authentication use cases: PKCE material, ephemeral exchange storage,
//! callback parsing, and the login flow controller.

pub mod callback;
pub mod exchange_store;
pub mod login_flow;
pub mod pkce;

pub use callback::{CallbackParams, parse_callback_url};
pub use exchange_store::ExchangeStore;
pub use login_flow::{CALLBACK_TIMEOUT, FlowAdapters, LoginFlow};
pub use pkce::PkceAttempt;
