//! Built-in backing services.
//!
//! Resolution order is user directory first, then authentication.

pub mod auth;
pub mod users;

pub use auth::{AuthService, Token, MAX_TOKEN_TTL_SECS};
pub use users::{Credentials, User, UserDirectory};
