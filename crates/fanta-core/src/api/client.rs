//! API client for the tournament service.
//!
//! Login goes out unauthenticated; every data request goes through
//! [`AuthFetch`] so expired access tokens are refreshed transparently.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::models::{Player, Tournament};

use super::fetch::{ApiRequest, AuthFetch, LoginRedirect};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/api/token/";
const TOURNAMENTS_PATH: &str = "/api/tournament/";
const PLAYERS_PATH: &str = "/api/player/";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Query filters for list endpoints. Empty values are skipped.
pub type Filters = BTreeMap<String, String>;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
}

/// API client for the tournament service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    fetch: AuthFetch,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Session,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let fetch = AuthFetch::new(client.clone(), session, &base_url, redirect);

        Ok(Self {
            client,
            base_url,
            fetch,
        })
    }

    pub fn session(&self) -> &Session {
        self.fetch.session()
    }

    /// Authenticate and persist the returned token pair
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "Login rejected");
            return Err(ApiError::LoginFailed(format!("server returned {}", status)));
        }

        let tokens: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))?;

        self.session()
            .save_tokens(&tokens.access, &tokens.refresh)
            .map_err(ApiError::Store)?;
        info!(username, "Login successful");
        Ok(())
    }

    /// Forget both tokens
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().clear().map_err(ApiError::Store)?;
        info!("Logged out");
        Ok(())
    }

    pub async fn fetch_tournaments(&self, filters: &Filters) -> Result<Vec<Tournament>, ApiError> {
        self.get_list(TOURNAMENTS_PATH, filters).await
    }

    pub async fn fetch_players(&self, filters: &Filters) -> Result<Vec<Player>, ApiError> {
        self.get_list(PLAYERS_PATH, filters).await
    }

    fn build_url(&self, path: &str, filters: &Filters) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid API URL: {}", e)))?;

        let params: Vec<_> = filters.iter().filter(|(_, v)| !v.is_empty()).collect();
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, filters: &Filters) -> Result<Vec<T>, ApiError> {
        let url = self.build_url(path, filters)?;
        let response = self.fetch.fetch(&ApiRequest::get(url.as_str())).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let items: Vec<T> = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })?;
        debug!(url = %url, count = items.len(), "Fetched list");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::api::fetch::LogRedirect;
    use crate::auth::MemoryTokenStore;

    fn client(base_url: &str) -> ApiClient {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        ApiClient::new(base_url, session, Arc::new(LogRedirect)).unwrap()
    }

    fn filters(pairs: &[(&str, &str)]) -> Filters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_url_skips_empty_filters() {
        let api = client("http://localhost:8000/");

        let url = api.build_url(TOURNAMENTS_PATH, &Filters::new()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/tournament/");

        let url = api
            .build_url(TOURNAMENTS_PATH, &filters(&[("is_active", "true"), ("season", "")]))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/tournament/?is_active=true");

        let url = api
            .build_url(PLAYERS_PATH, &filters(&[("name", "De Rossi"), ("main_role", "C")]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/player/?main_role=C&name=De+Rossi"
        );
    }

    #[test]
    fn test_build_url_rejects_bad_base() {
        let api = client("not a url");
        let err = api.build_url(PLAYERS_PATH, &Filters::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_login_saves_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", LOGIN_PATH)
            .match_body(Matcher::Json(json!({ "username": "mario", "password": "pw" })))
            .with_status(200)
            .with_body(r#"{"access": "a1", "refresh": "r1"}"#)
            .create_async()
            .await;

        let api = client(&server.url());
        api.login("mario", "pw").await.unwrap();

        assert_eq!(api.session().access_token().unwrap().as_deref(), Some("a1"));
        assert_eq!(api.session().refresh_token().unwrap().as_deref(), Some("r1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", LOGIN_PATH)
            .with_status(401)
            .create_async()
            .await;

        let api = client(&server.url());
        let err = api.login("mario", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::LoginFailed(_)));
        assert!(!api.session().is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_logout_clears_tokens() {
        let api = client("http://localhost:8000");
        api.session().save_tokens("a", "r").unwrap();
        api.logout().unwrap();
        assert!(!api.session().is_authenticated().unwrap());
        assert_eq!(api.session().refresh_token().unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_players_with_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PLAYERS_PATH)
            .match_query(Matcher::UrlEncoded("main_role".into(), "P".into()))
            .match_header("authorization", "Bearer a1")
            .with_status(200)
            .with_body(
                r#"[{"id": 1, "person": {"id": 1, "name": "Gianluigi", "surname": "Donnarumma"},
                    "main_role": "P", "overall": 88, "fanta_value": 20, "value": 60000000}]"#,
            )
            .create_async()
            .await;

        let api = client(&server.url());
        api.session().save_tokens("a1", "r1").unwrap();

        let players = api.fetch_players(&filters(&[("main_role", "P")])).await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].role_display(), "Portiere");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_tournaments_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", TOURNAMENTS_PATH)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let api = client(&server.url());
        match api.fetch_tournaments(&Filters::new()).await.unwrap_err() {
            ApiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_tournaments_bad_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", TOURNAMENTS_PATH)
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let api = client(&server.url());
        let err = api.fetch_tournaments(&Filters::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_expired_session_surfaces_through_client() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", TOURNAMENTS_PATH)
            .with_status(401)
            .create_async()
            .await;
        server
            .mock("POST", "/api/token/refresh/")
            .with_status(400)
            .create_async()
            .await;

        let api = client(&server.url());
        api.session().save_tokens("a1", "r1").unwrap();

        let err = api.fetch_tournaments(&Filters::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(!api.session().is_authenticated().unwrap());
    }
}
