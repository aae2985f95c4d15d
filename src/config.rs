//! Authentication configuration.
//!
//! Both components receive an `AuthConfig` explicitly at construction; there
//! is no ambient registry. The cookie prefix is a shared contract: the
//! session manager writes cookies under it and the token injector reads them
//! back under the same names.

use serde::{Deserialize, Serialize};

/// Default prefix for the guid and token cookie names
const DEFAULT_COOKIE_PREFIX: &str = "AuthenticationService_";

/// Cookie name suffix for the session guid
const GUID_COOKIE: &str = "guid";

/// Cookie name suffix for the session token
const TOKEN_COOKIE: &str = "token";

/// The login, logout and validate endpoint URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoints {
    pub login: String,
    pub logout: String,
    pub validate: String,
}

/// Configuration shared by the session manager and the token injector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Prefix prepended to the guid and token cookie names.
    /// Must be identical for both components, otherwise credential
    /// injection silently never fires.
    pub cookie_prefix: String,
    /// URL prefix under which the injector stamps credential headers.
    pub base_url: String,
    /// Server endpoints used by the session manager.
    pub endpoints: Endpoints,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_prefix: DEFAULT_COOKIE_PREFIX.to_string(),
            base_url: String::new(),
            endpoints: Endpoints::default(),
        }
    }
}

impl AuthConfig {
    /// Full name of the guid cookie
    pub fn guid_cookie(&self) -> String {
        format!("{}{}", self.cookie_prefix, GUID_COOKIE)
    }

    /// Full name of the token cookie
    pub fn token_cookie(&self) -> String {
        format!("{}{}", self.cookie_prefix, TOKEN_COOKIE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_names_use_prefix() {
        let config = AuthConfig {
            cookie_prefix: "Craod_".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(config.guid_cookie(), "Craod_guid");
        assert_eq!(config.token_cookie(), "Craod_token");
    }

    #[test]
    fn test_default_prefix() {
        let config = AuthConfig::default();
        assert_eq!(config.guid_cookie(), "AuthenticationService_guid");
        assert_eq!(config.token_cookie(), "AuthenticationService_token");
    }
}
