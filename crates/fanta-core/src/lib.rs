//! Core library for fantaclient.
//!
//! Authenticated access to the fantasy tournament API: token storage,
//! the refresh-and-replay request wrapper, and the tournament/player models.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiRequest, AuthFetch, Filters, LogRedirect, LoginRedirect};
pub use auth::{Session, TokenStore};
pub use config::{Config, TokenBackend};
