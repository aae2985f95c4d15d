//! API client for communicating with a Craod server.
//!
//! This is the host-side dispatch path for application requests: every
//! request handed to the client runs through the [`TokenInjector`] before it
//! reaches the transport, so credential headers are attached whenever the
//! target URL matches the configured base URL and both cookies exist.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cookies::CookieStore;

use super::injector::TokenInjector;
use super::transport::{HttpTransport, RequestDescriptor};

/// HTTP client for the Craod API.
pub struct ApiClient<T, C> {
    transport: T,
    injector: TokenInjector<C>,
}

impl<T: HttpTransport, C: CookieStore> ApiClient<T, C> {
    pub fn new(transport: T, injector: TokenInjector<C>) -> Self {
        Self {
            transport,
            injector,
        }
    }

    /// Run the injector over the request, then dispatch it.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Value> {
        let request = self.injector.request(request);
        debug!(method = %request.method, url = %request.url, "Dispatching request");
        self.transport.execute(request).await
    }

    /// Issue a GET request and parse the JSON response.
    pub async fn get<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        let body = self.execute(RequestDescriptor::get(url)).await?;
        serde_json::from_value(body)
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Issue a POST request with a JSON body and parse the JSON response.
    pub async fn post<R: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<R> {
        let data = serde_json::to_value(body).context("Failed to serialize request body")?;
        let response = self.execute(RequestDescriptor::post(url, data)).await?;
        serde_json::from_value(response)
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}
