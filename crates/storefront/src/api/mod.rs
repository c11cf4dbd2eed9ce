//! REST client for the shop backend.
//!
//! # Architecture
//!
//! - One `call` path for every endpoint: auth header, content negotiation,
//!   body decoding and error mapping happen here and nowhere else
//! - The server is the source of truth - no response caching
//! - A 401 from any endpoint ends the session: the stored token is cleared,
//!   the shopper is sent to the login view and the caller gets
//!   [`AppError::Unauthorized`]. Nothing is retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use grayshop_storefront::api::{ApiClient, Request};
//!
//! let client = ApiClient::new(&config, tokens, navigator)?;
//!
//! // Raw call: any JSON (or nothing) back
//! let body = client.call("/api/cart/3", Request::delete()).await?;
//!
//! // Typed endpoint wrapper
//! let products = client.list_products().await?;
//! ```

mod endpoints;

pub use endpoints::{NewStock, Picture, RegisterForm};

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::config::StorefrontConfig;
use crate::error::{AppError, FALLBACK_SERVER_MESSAGE, Result, clear_sentry_user};
use crate::navigation::Navigator;
use crate::token_store::TokenStore;

// =============================================================================
// Request
// =============================================================================

/// Request payload.
#[derive(Debug, Default)]
pub enum Body {
    /// No body, no content type.
    #[default]
    Empty,
    /// JSON document; `Content-Type: application/json` is added unless the
    /// caller set one.
    Json(Value),
    /// Multipart form; the transport picks the boundary and content type.
    Multipart(multipart::Form),
}

/// Method, body and extra headers for one API call.
#[derive(Debug)]
pub struct Request {
    method: Method,
    body: Body,
    headers: HeaderMap,
}

impl Request {
    /// Create a request with the given method and no body.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: Body::Empty,
            headers: HeaderMap::new(),
        }
    }

    /// `GET` request.
    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// `POST` request.
    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// `PUT` request.
    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    /// `DELETE` request.
    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Decode` if `payload` cannot be serialized.
    pub fn json(mut self, payload: &impl Serialize) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Attach a multipart form body.
    #[must_use]
    pub fn multipart(mut self, form: multipart::Form) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    /// Add an extra header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// HTTP method of this request.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the shop REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool, the token
/// store and the navigator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    navigator: Navigator,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// No request timeout is applied: a dispatched call runs until the
    /// server answers or the connection fails.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` if the HTTP client fails to build.
    pub fn new(
        config: &StorefrontConfig,
        tokens: Arc<dyn TokenStore>,
        navigator: Navigator,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("grayshop/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base.clone(),
                tokens,
                navigator,
            }),
        })
    }

    /// The token store consulted before every request.
    #[must_use]
    pub fn tokens(&self) -> &dyn TokenStore {
        self.inner.tokens.as_ref()
    }

    /// The navigator redirected on 401.
    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    /// Whether a credential is currently stored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token store cannot be read.
    pub fn has_token(&self) -> Result<bool> {
        Ok(self.inner.tokens.get()?.is_some())
    }

    /// Resolve an API path (`/api/...`, optionally with a query) against the base URL.
    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Perform one API call.
    ///
    /// Returns the decoded JSON body, or `None` when the body is empty.
    ///
    /// # Errors
    ///
    /// - `AppError::Unauthorized` on 401 (after clearing the token and redirecting)
    /// - `AppError::Server` on any other non-2xx status
    /// - `AppError::Http` on transport failure
    /// - `AppError::Decode` if a success body is not valid JSON
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn call(&self, path: &str, request: Request) -> Result<Option<Value>> {
        let url = self.url(path)?;
        let Request {
            method,
            body,
            mut headers,
        } = request;

        if let Some(token) = self.inner.tokens.get()? {
            let mut value = HeaderValue::from_str(&token.authorization_value()).map_err(|_| {
                AppError::ClientValidation("登录凭证格式无效，请重新登录".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.inner.http.request(method, url);
        builder = match body {
            Body::Empty => builder.headers(headers),
            Body::Json(payload) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                builder.headers(headers).body(serde_json::to_vec(&payload)?)
            }
            Body::Multipart(form) => {
                // The transport must choose the boundary.
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(form)
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(self.end_session(&text).await);
        }

        if !status.is_success() {
            let message = server_message(&text);
            tracing::warn!(status = %status, message = %message, "API call rejected");
            return Err(AppError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Perform one API call and decode the body as `T`.
    ///
    /// An empty body decodes as JSON `null`, so `T = Option<_>` maps it to
    /// `None`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::call`], plus `AppError::Decode` if the body does
    /// not match `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, request: Request) -> Result<T> {
        let value = self.call(path, request).await?;
        Ok(serde_json::from_value(value.unwrap_or(Value::Null))?)
    }

    /// Handle a 401: forget the credential and send the shopper to login.
    async fn end_session(&self, body: &str) -> AppError {
        if let Err(e) = self.inner.tokens.clear() {
            tracing::error!(error = %e, "Failed to clear token after 401");
        }
        clear_sentry_user();
        self.inner.navigator.redirect_to_login().await;
        tracing::info!("Session rejected by server");

        AppError::Unauthorized(message_field(body))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// First non-empty of `msg`, then `error`, from a JSON error body.
fn message_field(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "error"].into_iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}

/// Message to show for a rejected call.
fn server_message(body: &str) -> String {
    message_field(body).unwrap_or_else(|| FALLBACK_SERVER_MESSAGE.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::navigation::Route;
    use crate::token_store::MemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        let config = StorefrontConfig::for_base_url(base).unwrap();
        ApiClient::new(
            &config,
            Arc::new(MemoryTokenStore::new()),
            Navigator::new(Route::Catalog),
        )
        .unwrap()
    }

    #[test]
    fn test_server_message_prefers_msg() {
        assert_eq!(
            server_message(r#"{"msg": "下单失败", "error": "库存不足: 鼠标"}"#),
            "下单失败"
        );
    }

    #[test]
    fn test_server_message_falls_back_to_error() {
        assert_eq!(server_message(r#"{"error": "参数错误"}"#), "参数错误");
        assert_eq!(server_message(r#"{"msg": "", "error": "参数错误"}"#), "参数错误");
    }

    #[test]
    fn test_server_message_generic_fallback() {
        assert_eq!(server_message(""), FALLBACK_SERVER_MESSAGE);
        assert_eq!(server_message("<html>502</html>"), FALLBACK_SERVER_MESSAGE);
        assert_eq!(server_message(r#"{"msg": 3}"#), FALLBACK_SERVER_MESSAGE);
    }

    #[test]
    fn test_url_join_keeps_base_path() {
        let client = client("http://127.0.0.1:8080/shop");
        assert_eq!(
            client.url("/api/orders?page=1&page_size=20").unwrap().as_str(),
            "http://127.0.0.1:8080/shop/api/orders?page=1&page_size=20"
        );
    }

    #[test]
    fn test_request_json_body() {
        let request = Request::post()
            .json(&serde_json::json!({"stock_id": 1}))
            .unwrap();
        assert_eq!(request.method(), Method::POST);
        assert!(matches!(request.body, Body::Json(_)));
    }
}
