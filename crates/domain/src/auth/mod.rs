//! Authentication domain types

mod claims;
mod tokens;

pub use claims::{Audience, IdentityClaims, UserInfo};
pub use tokens::TokenSet;
