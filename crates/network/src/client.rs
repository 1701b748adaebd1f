// crates/network/src/client.rs
//! HTTP client for the budgeting REST API

use crate::error::{NetworkError, NetworkResult};
use nestegg_config::ApiConfig;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is resolved against
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.request_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Called after the server rejects the bearer token
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Client for the REST backend
///
/// Attaches `Authorization: Bearer <token>` whenever a token is set. A `401`
/// from any call clears the token and fires the unauthorized hook. Clones
/// share the token and the hook.
#[derive(Clone)]
pub struct ApiClient {
    inner: ReqwestClient,
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
    on_unauthorized: Arc<RwLock<Option<UnauthorizedHook>>>,
}

impl ApiClient {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let inner = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            inner,
            base_url,
            token: Arc::new(RwLock::new(None)),
            on_unauthorized: Arc::new(RwLock::new(None)),
        })
    }

    /// Returns the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sets or clears the bearer token
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Returns the current bearer token
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs the hook fired when the server answers `401`
    pub fn on_unauthorized<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self
            .on_unauthorized
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(hook));
    }

    /// Resolves an API path against the base URL
    pub fn url(&self, path: &str) -> NetworkResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", joined, e)))
    }

    /// Performs a GET request and decodes the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> NetworkResult<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Ok(response.json().await?)
    }

    /// Performs a POST request with a JSON body and decodes the JSON answer
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> NetworkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path)?.json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// Performs a PUT request with a JSON body and decodes the JSON answer
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> NetworkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::PUT, path)?.json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// Performs a DELETE request
    pub async fn delete(&self, path: &str) -> NetworkResult<()> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    /// Calls `GET /health` without credentials
    pub async fn health(&self) -> NetworkResult<()> {
        let response = self.inner.get(self.url("health")?).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }

    /// Builds a request with the bearer token attached
    fn request(&self, method: Method, path: &str) -> NetworkResult<RequestBuilder> {
        let builder = self.inner.request(method, self.url(path)?);
        Ok(match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends a request and maps non-success statuses to errors
    async fn send(&self, builder: RequestBuilder) -> NetworkResult<Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Server rejected credentials, clearing session");
            self.set_token(None);
            let hook = self
                .on_unauthorized
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(hook) = hook {
                hook();
            }
            return Err(NetworkError::Unauthorized);
        }

        Err(status_error(response).await)
    }
}

/// Builds a status error, preferring the server's own message
async fn status_error(response: Response) -> NetworkError {
    let status = response.status();
    let fallback = status.canonical_reason().unwrap_or("Unknown").to_string();
    let body = response.text().await.unwrap_or_default();

    NetworkError::Status {
        status: status.as_u16(),
        message: server_message(&body).unwrap_or(fallback),
    }
}

/// Extracts `message` or `error` from a JSON error body, or uses short plain text
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::to_string);
    }

    (trimmed.len() <= 200).then(|| trimmed.to_string())
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token().is_some())
            .finish()
    }
}
