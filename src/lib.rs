//! Client-side session and credential management for the Craod API.
//!
//! Two cooperating components make up the crate:
//!
//! - [`SessionManager`] signs a user in and out, persists the issued
//!   guid/token pair in a cookie store and validates it against the server.
//! - [`TokenInjector`] stamps the stored credentials onto outgoing requests
//!   whose URL falls under a configured base URL.
//!
//! The two components never call each other; they share only the cookie
//! store, which keeps their initialization free of cycles. Both receive an
//! explicit [`AuthConfig`] at construction, and the cookie prefix in that
//! config must be identical on both sides for injection to fire.
//!
//! The cookie store and the HTTP transport are injected capabilities
//! ([`CookieStore`] and [`HttpTransport`]), so the whole crate is testable
//! without a browser or a network.

pub mod api;
pub mod auth;
pub mod config;
pub mod cookies;

pub use api::{
    ApiClient, AuthError, HttpTransport, ReqwestTransport, RequestDescriptor, TokenInjector,
};
pub use auth::{SessionManager, SignInRequest, SignInResponse};
pub use config::{AuthConfig, Endpoints};
pub use cookies::{CookieOptions, CookieStore, MemoryCookieStore};
