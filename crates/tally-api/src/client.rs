//! # API Client
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Method                  Request                          Auth          │
//! │  ──────────────────────  ───────────────────────────────  ──────────    │
//! │  login(username, pass)   POST /v1/login/        JSON      none          │
//! │  logout(refresh, token)  POST /v1/logout/       JSON      Bearer        │
//! │  fetch_items(token)      GET  /v1/items/                  Bearer        │
//! │  execute_sale(sale)      POST /v1/sales/        JSON      Bearer        │
//! │  update_sales(update)    POST /v1/update-sales/ JSON      Bearer        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call is a single attempt; retrying is left to the user.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use tally_core::error::ClientError;
use tally_core::types::{
    Item, LoginRequest, LoginResponse, LogoutRequest, SaleRequest, StockUpdateRequest,
};
use tally_core::validation::require_token;

use crate::error::{classify, transport, ApiResult, Endpoint};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        ApiConfig {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the POS backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("tally-terminal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(ApiClient {
            base_url: with_trailing_slash(config.base_url),
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchanges credentials for tokens.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post_json(Endpoint::Login, None, &body).await?;
        info!(user_id = response.user.user_id, "Login accepted");
        Ok(response)
    }

    /// Invalidates `refresh_token` on the server.
    pub async fn logout(&self, refresh_token: &str, access_token: &str) -> ApiResult<()> {
        let token = require_token(Some(access_token))?;
        let body = LogoutRequest {
            refresh_token: refresh_token.to_string(),
        };
        let _: Value = self.post_json(Endpoint::Logout, Some(token), &body).await?;
        Ok(())
    }

    // =========================================================================
    // Items and Sales
    // =========================================================================

    /// Full item list. The caller replaces its collection with the result.
    pub async fn fetch_items(&self, token: Option<&str>) -> ApiResult<Vec<Item>> {
        let token = require_token(token)?;
        let url = self.url(Endpoint::Items)?;
        debug!(url = %url, "GET items");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport(Endpoint::Items, &e))?;

        let items: Vec<Item> = read_json(Endpoint::Items, response).await?;
        debug!(count = items.len(), "Items fetched");
        Ok(items)
    }

    /// Records a sale. Returns the server's response body unchanged.
    pub async fn execute_sale(&self, sale: &SaleRequest, token: Option<&str>) -> ApiResult<Value> {
        let token = require_token(token)?;
        self.post_json(Endpoint::Sales, Some(token), sale).await
    }

    /// Decrements stock for the sold lines. Returns the response body.
    pub async fn update_sales(
        &self,
        update: &StockUpdateRequest,
        token: Option<&str>,
    ) -> ApiResult<Value> {
        let token = require_token(token)?;
        self.post_json(Endpoint::UpdateSales, Some(token), update)
            .await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn url(&self, endpoint: Endpoint) -> ApiResult<Url> {
        self.base_url
            .join(endpoint.path())
            .map_err(|e| ClientError::network(format!("invalid URL: {}", e)))
    }

    async fn post_json<B, T>(&self, endpoint: Endpoint, token: Option<&str>, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint)?;
        debug!(url = %url, "POST");

        let mut request = self.http.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport(endpoint, &e))?;

        read_json(endpoint, response).await
    }
}

/// Decodes a success body or classifies a failure.
///
/// An empty success body decodes as JSON `null`.
async fn read_json<T: DeserializeOwned>(endpoint: Endpoint, response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport(endpoint, &e))?;

    if !status.is_success() {
        let err = classify(endpoint, status.as_u16(), &text);
        warn!(
            endpoint = endpoint.path(),
            status = status.as_u16(),
            error = %err,
            "Request rejected"
        );
        return Err(err);
    }

    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    serde_json::from_str(text).map_err(|e| {
        warn!(endpoint = endpoint.path(), error = %e, "Undecodable response body");
        ClientError::network("unexpected response from the server")
    })
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_prefix() {
        let client =
            ApiClient::new(ApiConfig::new(Url::parse("http://pos.local/api").unwrap())).unwrap();
        assert_eq!(
            client.url(Endpoint::Items).unwrap().as_str(),
            "http://pos.local/api/v1/items/"
        );

        let client = ApiClient::new(ApiConfig::new(Url::parse("http://pos.local").unwrap())).unwrap();
        assert_eq!(
            client.url(Endpoint::UpdateSales).unwrap().as_str(),
            "http://pos.local/v1/update-sales/"
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        // Port 9 is discard; nothing should be sent anyway
        let client = ApiClient::new(ApiConfig::new(Url::parse("http://127.0.0.1:9").unwrap())).unwrap();
        let err = client.fetch_items(None).await.unwrap_err();
        assert!(err.is_auth());
        let err = client.fetch_items(Some("")).await.unwrap_err();
        assert!(err.is_auth());
    }
}
