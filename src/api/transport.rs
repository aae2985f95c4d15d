//! HTTP transport seam.
//!
//! Requests flow through the crate as [`RequestDescriptor`] values so that
//! interceptors can inspect and mutate them before dispatch. The actual
//! dispatch happens behind the [`HttpTransport`] trait; [`ReqwestTransport`]
//! is the production implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value;

use super::AuthError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// An outgoing HTTP request before dispatch.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub data: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            data: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, data: Value) -> Self {
        let mut request = Self::new(Method::POST, url);
        request.data = Some(data);
        request
    }
}

/// Asynchronous HTTP dispatch.
///
/// The session manager and the `ApiClient` pipeline are generic over this
/// trait, so tests substitute a recording stub and never touch the network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Dispatch the request and return the parsed JSON response body.
    ///
    /// Non-success statuses surface as [`AuthError`] values; transport-level
    /// failures surface as whatever the implementation produces.
    async fn execute(&self, request: RequestDescriptor) -> Result<Value>;
}

/// Production transport over reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<Value> {
        let mut builder = self
            .client
            .request(request.method, request.url.as_str())
            .headers(request.headers);
        if let Some(ref data) = request.data {
            builder = builder.json(data);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", request.url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::from_status(status, &body).into());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", request.url))
    }
}
