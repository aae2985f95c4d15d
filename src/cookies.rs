//! Cookie storage abstraction.
//!
//! The session manager and the token injector both talk to a [`CookieStore`]
//! rather than to any ambient browser global, so the crate can run in tests
//! and in non-browser hosts. [`MemoryCookieStore`] is the bundled
//! implementation; embedders with a real cookie jar implement the trait
//! themselves.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Options applied when writing a cookie.
///
/// A cookie without an expiry is session-scoped: it lives until the store
/// itself is dropped.
#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    pub expires: Option<DateTime<Utc>>,
}

/// Shared cookie storage.
///
/// Operations are synchronous; implementations are expected to complete each
/// call without suspension.
pub trait CookieStore: Send + Sync {
    /// Get the value of a cookie, if present and not expired.
    fn get(&self, name: &str) -> Option<String>;

    /// Write a cookie, replacing any previous value.
    fn put(&self, name: &str, value: &str, options: CookieOptions);

    /// Delete a cookie. Removing an absent cookie is a no-op.
    fn remove(&self, name: &str);
}

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    expires: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_expired(&self) -> bool {
        self.expires.map(|at| Utc::now() > at).unwrap_or(false)
    }
}

/// In-memory cookie store backed by a mutex-guarded map.
///
/// Expired cookies are dropped lazily, on the first read that observes them.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: Mutex<HashMap<String, StoredCookie>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiry recorded for a cookie, if the cookie exists and carries one.
    pub fn expiry(&self, name: &str) -> Option<DateTime<Utc>> {
        self.cookies
            .lock()
            .unwrap()
            .get(name)
            .and_then(|cookie| cookie.expires)
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        let mut cookies = self.cookies.lock().unwrap();
        let expired = cookies
            .get(name)
            .map(|cookie| cookie.is_expired())
            .unwrap_or(false);
        if expired {
            cookies.remove(name);
            return None;
        }
        cookies.get(name).map(|cookie| cookie.value.clone())
    }

    fn put(&self, name: &str, value: &str, options: CookieOptions) {
        self.cookies.lock().unwrap().insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires: options.expires,
            },
        );
    }

    fn remove(&self, name: &str) {
        self.cookies.lock().unwrap().remove(name);
    }
}
