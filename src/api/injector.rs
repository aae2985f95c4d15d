//! Credential injection for outgoing requests.
//!
//! The injector runs once per outgoing request, ahead of dispatch. It reads
//! the guid and token cookies directly from the cookie store - never through
//! the session manager, which would create a circular dependency between the
//! two components - and stamps them as headers when the request targets the
//! configured base URL.

use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};

use crate::config::AuthConfig;
use crate::cookies::CookieStore;

use super::transport::RequestDescriptor;

/// Header carrying the session guid, `Craod-Guid` on the wire.
pub const HEADER_GUID: &str = "craod-guid";

/// Header carrying the session token, `Craod-Token` on the wire.
pub const HEADER_TOKEN: &str = "craod-token";

/// Stamps stored session credentials onto matching outgoing requests.
pub struct TokenInjector<C> {
    config: AuthConfig,
    cookies: Arc<C>,
}

impl<C: CookieStore> TokenInjector<C> {
    pub fn new(config: AuthConfig, cookies: Arc<C>) -> Self {
        Self { config, cookies }
    }

    /// Inspect an outgoing request and attach the credential headers when
    /// the URL starts with the configured base URL and both cookies exist.
    ///
    /// There is no error path: a missing cookie, or a cookie value that is
    /// not a legal header value, skips injection and the descriptor is
    /// returned as it came in.
    pub fn request(&self, mut request: RequestDescriptor) -> RequestDescriptor {
        if !request.url.starts_with(&self.config.base_url) {
            return request;
        }

        let guid = self.cookies.get(&self.config.guid_cookie());
        let token = self.cookies.get(&self.config.token_cookie());
        if let (Some(guid), Some(token)) = (guid, token) {
            // Both headers or neither
            if let (Ok(guid), Ok(token)) = (
                HeaderValue::from_str(&guid),
                HeaderValue::from_str(&token),
            ) {
                request
                    .headers
                    .insert(HeaderName::from_static(HEADER_GUID), guid);
                request
                    .headers
                    .insert(HeaderName::from_static(HEADER_TOKEN), token);
            }
        }
        request
    }
}
