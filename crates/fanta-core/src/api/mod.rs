//! REST API client module for the tournament service.
//!
//! This module provides the `ApiClient` for logging in and fetching
//! tournament and player data, and the `AuthFetch` wrapper it sends
//! data requests through.
//!
//! The API uses JWT bearer tokens: a short-lived access token plus a
//! refresh token exchanged at `/api/token/refresh/`.

pub mod client;
pub mod error;
pub mod fetch;

pub use client::{ApiClient, Filters};
pub use error::ApiError;
pub use fetch::{ApiRequest, AuthFetch, LogRedirect, LoginRedirect, LOGIN_LOCATION, REFRESH_PATH};
