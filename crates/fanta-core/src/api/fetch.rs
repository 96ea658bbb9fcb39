//! Authenticated request wrapper.
//!
//! [`AuthFetch::fetch`] attaches the stored access token as a bearer
//! credential, and on a 401 trades the refresh token for a new access token
//! and replays the request once. When recovery is impossible the stored
//! tokens are erased and the session is redirected to the login view.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::Session;

use super::ApiError;

/// Path of the token refresh endpoint, relative to the API base URL
pub const REFRESH_PATH: &str = "/api/token/refresh/";

/// Where the session is sent after an irrecoverable auth failure
pub const LOGIN_LOCATION: &str = "/login";

/// An outgoing request. Borrowed by the wrapper so it can be replayed.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as JSON and set the content type
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request body: {}", e)))?;
        Ok(self
            .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(bytes))
    }
}

/// Receives the redirect to the login view when a session ends.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, location: &str);
}

impl<F> LoginRedirect for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect_to_login(&self, location: &str) {
        self(location)
    }
}

/// Redirect that only records the event in the log
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self, location: &str) {
        warn!(location, "Session ended, login required");
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Bearer-token request wrapper with single-shot refresh.
/// Clone is cheap - the HTTP client and token store are shared.
#[derive(Clone)]
pub struct AuthFetch {
    client: Client,
    session: Session,
    refresh_url: String,
    redirect: Arc<dyn LoginRedirect>,
}

impl AuthFetch {
    pub fn new(
        client: Client,
        session: Session,
        base_url: &str,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            client,
            session,
            refresh_url: format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH),
            redirect,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Issue `request` with the current access token.
    ///
    /// A 401 with a stored refresh token triggers exactly one refresh and one
    /// replay. Any status other than 401 is returned untouched.
    pub async fn fetch(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let access = self.session.access_token().map_err(ApiError::Store)?;
        let refresh = self.session.refresh_token().map_err(ApiError::Store)?;

        let mut response = self.send(request, access.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(refresh) = refresh {
                debug!(url = %request.url, "Access token rejected, refreshing");
                let access = self.refresh_access_token(&refresh).await?;
                response = self.send(request, Some(&access)).await?;
            }
        }

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %request.url, "Request unauthorized, ending session");
            self.end_session();
            return Err(ApiError::Unauthorized);
        }

        Ok(response)
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ApiError> {
        let mut headers = request.headers.clone();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(headers);
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = %response.status(),
            "Request completed"
        );
        Ok(response)
    }

    /// Trade the refresh token for a new access token and persist it.
    /// A rejected refresh ends the session.
    async fn refresh_access_token(&self, refresh: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(&self.refresh_url)
            .json(&RefreshRequest { refresh })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh rejected, ending session");
            self.end_session();
            return Err(ApiError::SessionExpired);
        }

        let data: RefreshResponse = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse refresh response: {}", e))
        })?;

        self.session
            .set_access_token(&data.access)
            .map_err(ApiError::Store)?;
        info!("Access token refreshed");
        Ok(data.access)
    }

    fn end_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session tokens");
        }
        self.redirect.redirect_to_login(LOGIN_LOCATION);
    }
}
