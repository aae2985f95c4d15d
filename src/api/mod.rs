//! HTTP plumbing for the Craod API.
//!
//! This module provides the request descriptor and transport seam, the
//! credential injector that stamps session cookies onto outgoing requests,
//! and the `ApiClient` pipeline that ties the two together.

pub mod client;
pub mod error;
pub mod injector;
pub mod transport;

pub use client::ApiClient;
pub use error::AuthError;
pub use injector::{TokenInjector, HEADER_GUID, HEADER_TOKEN};
pub use transport::{HttpTransport, ReqwestTransport, RequestDescriptor};
