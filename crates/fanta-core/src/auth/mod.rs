//! Authentication module for managing session tokens.
//!
//! This module provides:
//! - `TokenStore`: key-value persistence for tokens (memory, file, OS keychain)
//! - `Session`: access/refresh token pair read and written through a store
//!
//! Tokens are stored under the fixed keys `token` and `refresh_token`.

pub mod session;
pub mod store;

pub use session::Session;
pub use store::{
    FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
