//! Session lifecycle: sign-in, validation, sign-out.
//!
//! The session manager owns the in-memory current user and the two
//! credential cookies. It never talks to the token injector; the cookie
//! store is the only thing the two components share.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::api::{AuthError, HttpTransport, RequestDescriptor};
use crate::config::AuthConfig;
use crate::cookies::{CookieOptions, CookieStore};

/// Cookie lifetime, in days, for remember-me sign-ins
const REMEMBER_ME_EXPIRY_DAYS: i64 = 90;

/// Credentials submitted to the login endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// Credential pair issued by the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub guid: String,
    pub token: String,
}

/// Manages the current user and the authentication cookies.
///
/// The current user is whatever JSON value the validate endpoint returned;
/// the server's validate response doubles as the user object. It is held in
/// memory only - the cookies are the sole persisted state.
pub struct SessionManager<T, C> {
    config: AuthConfig,
    transport: T,
    cookies: Arc<C>,
    current_user: Option<Value>,
    validating: bool,
}

impl<T: HttpTransport, C: CookieStore> SessionManager<T, C> {
    pub fn new(config: AuthConfig, transport: T, cookies: Arc<C>) -> Self {
        Self {
            config,
            transport,
            cookies,
            current_user: None,
            validating: false,
        }
    }

    /// Set the currently navigating user
    pub fn set_current_user(&mut self, user: Value) {
        self.current_user = Some(user);
    }

    /// Get the currently navigating user
    pub fn current_user(&self) -> Option<&Value> {
        self.current_user.as_ref()
    }

    /// Returns true if there is a current user set
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// Returns true while a validate call is in flight
    pub fn is_validating(&self) -> bool {
        self.validating
    }

    /// Returns true if server validation is still required: either
    /// credential cookie is missing.
    pub fn should_authenticate(&self) -> bool {
        let guid = self.cookies.get(&self.config.guid_cookie());
        let token = self.cookies.get(&self.config.token_cookie());
        guid.is_none() || token.is_none()
    }

    /// Remove local information on the current user: the in-memory user and
    /// both credential cookies. Idempotent.
    pub fn remove_current_user(&mut self) {
        self.current_user = None;
        self.cookies.remove(&self.config.guid_cookie());
        self.cookies.remove(&self.config.token_cookie());
    }

    /// Attempt a sign-in against the login endpoint.
    ///
    /// On success the issued guid and token are written to the cookie store,
    /// with a 90-day expiry when `remember_me` was requested and
    /// session-scoped otherwise. On failure local session state is cleared
    /// and the original error is returned.
    ///
    /// The current user is not set here; call [`validate`](Self::validate)
    /// afterwards to load it.
    pub async fn sign_in(&mut self, login: &SignInRequest) -> Result<SignInResponse> {
        let request = RequestDescriptor::post(
            self.config.endpoints.login.as_str(),
            serde_json::to_value(login).context("Failed to serialize sign-in request")?,
        );

        let result = match self.transport.execute(request).await {
            Ok(body) => serde_json::from_value::<SignInResponse>(body)
                .context("Failed to parse sign-in response"),
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                let mut options = CookieOptions::default();
                if login.remember_me {
                    options.expires = Some(Utc::now() + Duration::days(REMEMBER_ME_EXPIRY_DAYS));
                }
                self.cookies
                    .put(&self.config.guid_cookie(), &response.guid, options.clone());
                self.cookies
                    .put(&self.config.token_cookie(), &response.token, options);
                debug!("Sign-in succeeded, session cookies stored");
                Ok(response)
            }
            Err(err) => {
                warn!("Sign-in failed, clearing local session state");
                self.remove_current_user();
                Err(err)
            }
        }
    }

    /// Validate the stored credentials against the server and load the user.
    ///
    /// When either credential cookie is missing this rejects immediately
    /// with [`AuthError::MissingCredentials`], without a transport call. On
    /// a successful response the body becomes the current user; on failure
    /// local session state is cleared. The validating flag is reset in both
    /// cases, as the final step.
    pub async fn validate(&mut self) -> Result<Value> {
        let guid = self.cookies.get(&self.config.guid_cookie());
        let token = self.cookies.get(&self.config.token_cookie());
        let (Some(guid), Some(token)) = (guid, token) else {
            self.current_user = None;
            return Err(AuthError::MissingCredentials.into());
        };

        self.validating = true;
        let request = RequestDescriptor::post(
            self.config.endpoints.validate.as_str(),
            json!({ "guid": guid, "token": token }),
        );
        let result = match self.transport.execute(request).await {
            Ok(user) => {
                debug!("Session validated");
                self.set_current_user(user.clone());
                Ok(user)
            }
            Err(err) => {
                warn!("Session validation failed, clearing local session state");
                self.remove_current_user();
                Err(err)
            }
        };
        self.validating = false;
        result
    }

    /// Sign out the current user.
    ///
    /// Local state is cleared unconditionally, before the server is
    /// involved. When either credential was already missing this resolves
    /// immediately; otherwise the logout endpoint is called and its outcome
    /// returned as-is.
    pub async fn sign_out(&mut self) -> Result<()> {
        let guid = self.cookies.get(&self.config.guid_cookie());
        let token = self.cookies.get(&self.config.token_cookie());
        self.remove_current_user();

        let (Some(guid), Some(token)) = (guid, token) else {
            return Ok(());
        };

        let request = RequestDescriptor::post(
            self.config.endpoints.logout.as_str(),
            json!({ "guid": guid, "token": token }),
        );
        self.transport.execute(request).await?;
        debug!("Signed out on server");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use crate::api::transport::testing::StubTransport;
    use crate::config::Endpoints;
    use crate::cookies::MemoryCookieStore;

    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            cookie_prefix: "Craod_".to_string(),
            base_url: "https://api.craod.test".to_string(),
            endpoints: Endpoints {
                login: "https://api.craod.test/login".to_string(),
                logout: "https://api.craod.test/logout".to_string(),
                validate: "https://api.craod.test/validate".to_string(),
            },
        }
    }

    fn setup() -> (
        SessionManager<StubTransport, MemoryCookieStore>,
        StubTransport,
        Arc<MemoryCookieStore>,
    ) {
        let transport = StubTransport::new();
        let cookies = Arc::new(MemoryCookieStore::new());
        let manager = SessionManager::new(test_config(), transport.clone(), cookies.clone());
        (manager, transport, cookies)
    }

    fn put_credentials(cookies: &MemoryCookieStore) {
        cookies.put("Craod_guid", "g", CookieOptions::default());
        cookies.put("Craod_token", "t", CookieOptions::default());
    }

    fn sign_in_request(remember_me: bool) -> SignInRequest {
        SignInRequest {
            email: "ada@craod.test".to_string(),
            password: "hunter2".to_string(),
            remember_me,
        }
    }

    // -------------------------------------------------------------------------
    // Current user
    // -------------------------------------------------------------------------

    #[test]
    fn test_set_and_get_current_user() {
        let (mut manager, _, _) = setup();
        assert!(manager.current_user().is_none());
        assert!(!manager.is_authenticated());

        manager.set_current_user(json!({"displayName": "Ada"}));
        assert_eq!(manager.current_user(), Some(&json!({"displayName": "Ada"})));
        assert!(manager.is_authenticated());
    }

    #[test]
    fn test_remove_current_user_clears_user_and_cookies() {
        let (mut manager, _, cookies) = setup();
        put_credentials(&cookies);
        manager.set_current_user(json!({"id": 1}));

        manager.remove_current_user();
        assert!(!manager.is_authenticated());
        assert_eq!(cookies.get("Craod_guid"), None);
        assert_eq!(cookies.get("Craod_token"), None);

        // Idempotent
        manager.remove_current_user();
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn test_should_authenticate_over_all_presence_combinations() {
        let (manager, _, cookies) = setup();

        assert!(manager.should_authenticate());

        cookies.put("Craod_guid", "g", CookieOptions::default());
        assert!(manager.should_authenticate());

        cookies.remove("Craod_guid");
        cookies.put("Craod_token", "t", CookieOptions::default());
        assert!(manager.should_authenticate());

        cookies.put("Craod_guid", "g", CookieOptions::default());
        assert!(!manager.should_authenticate());
    }

    // -------------------------------------------------------------------------
    // Sign-in
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sign_in_posts_credentials_in_wire_form() {
        let (mut manager, transport, _) = setup();
        transport.push_ok(json!({"guid": "abc", "token": "xyz"}));

        manager.sign_in(&sign_in_request(false)).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, "https://api.craod.test/login");
        assert_eq!(
            requests[0].data,
            Some(json!({
                "email": "ada@craod.test",
                "password": "hunter2",
                "rememberMe": false
            }))
        );
    }

    #[tokio::test]
    async fn test_sign_in_stores_session_cookies_without_expiry() {
        let (mut manager, transport, cookies) = setup();
        transport.push_ok(json!({"guid": "abc", "token": "xyz"}));

        let response = manager.sign_in(&sign_in_request(false)).await.unwrap();
        assert_eq!(response.guid, "abc");
        assert_eq!(response.token, "xyz");

        assert_eq!(cookies.get("Craod_guid").as_deref(), Some("abc"));
        assert_eq!(cookies.get("Craod_token").as_deref(), Some("xyz"));
        assert_eq!(cookies.expiry("Craod_guid"), None);
        assert_eq!(cookies.expiry("Craod_token"), None);

        // Sign-in alone does not authenticate; validate() does that
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_remember_me_sets_ninety_day_expiry() {
        let (mut manager, transport, cookies) = setup();
        transport.push_ok(json!({"guid": "abc", "token": "xyz"}));

        manager.sign_in(&sign_in_request(true)).await.unwrap();

        let expected = Utc::now() + Duration::days(90);
        for name in ["Craod_guid", "Craod_token"] {
            let expires = cookies.expiry(name).expect("cookie has an expiry");
            assert!((expires - expected).num_minutes().abs() < 5);
        }
    }

    #[tokio::test]
    async fn test_sign_in_failure_clears_state_and_surfaces_error() {
        let (mut manager, transport, cookies) = setup();
        put_credentials(&cookies);
        manager.set_current_user(json!({"id": 1}));
        transport.push_err(AuthError::Unauthorized.into());

        let err = manager.sign_in(&sign_in_request(false)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::Unauthorized)
        ));
        assert!(!manager.is_authenticated());
        assert_eq!(cookies.get("Craod_guid"), None);
        assert_eq!(cookies.get("Craod_token"), None);
    }

    #[tokio::test]
    async fn test_sign_in_unparseable_body_clears_state() {
        let (mut manager, transport, cookies) = setup();
        put_credentials(&cookies);
        transport.push_ok(json!({"unexpected": true}));

        assert!(manager.sign_in(&sign_in_request(false)).await.is_err());
        assert_eq!(cookies.get("Craod_guid"), None);
        assert_eq!(cookies.get("Craod_token"), None);
    }

    // -------------------------------------------------------------------------
    // Validate
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_validate_rejects_without_transport_call_when_cookie_missing() {
        let (mut manager, transport, cookies) = setup();
        cookies.put("Craod_guid", "g", CookieOptions::default());
        manager.set_current_user(json!({"id": 1}));

        let err = manager.validate().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::MissingCredentials)
        ));
        assert!(transport.requests().is_empty());
        assert!(!manager.is_authenticated());
        assert!(!manager.is_validating());

        // Fast rejection only clears the in-memory user, not the cookies
        assert_eq!(cookies.get("Craod_guid").as_deref(), Some("g"));
    }

    #[tokio::test]
    async fn test_validate_success_stores_response_as_current_user() {
        let (mut manager, transport, cookies) = setup();
        put_credentials(&cookies);
        transport.push_ok(json!({"displayName": "Ada", "guid": "g"}));

        let user = manager.validate().await.unwrap();
        assert_eq!(user, json!({"displayName": "Ada", "guid": "g"}));
        assert_eq!(manager.current_user(), Some(&user));
        assert!(manager.is_authenticated());
        assert!(!manager.is_validating());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.craod.test/validate");
        assert_eq!(requests[0].data, Some(json!({"guid": "g", "token": "t"})));
    }

    #[tokio::test]
    async fn test_validate_failure_clears_state_and_flag() {
        let (mut manager, transport, cookies) = setup();
        put_credentials(&cookies);
        manager.set_current_user(json!({"id": 1}));
        transport.push_err(AuthError::Unauthorized.into());

        let err = manager.validate().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::Unauthorized)
        ));
        assert!(!manager.is_authenticated());
        assert!(!manager.is_validating());
        assert_eq!(cookies.get("Craod_guid"), None);
        assert_eq!(cookies.get("Craod_token"), None);
    }

    // -------------------------------------------------------------------------
    // Sign-out
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sign_out_posts_credentials_read_before_cleanup() {
        let (mut manager, transport, cookies) = setup();
        put_credentials(&cookies);
        manager.set_current_user(json!({"id": 1}));
        transport.push_ok(json!({}));

        manager.sign_out().await.unwrap();

        assert!(!manager.is_authenticated());
        assert_eq!(cookies.get("Craod_guid"), None);
        assert_eq!(cookies.get("Craod_token"), None);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.craod.test/logout");
        assert_eq!(requests[0].data, Some(json!({"guid": "g", "token": "t"})));
    }

    #[tokio::test]
    async fn test_sign_out_without_credentials_skips_transport() {
        let (mut manager, transport, cookies) = setup();
        cookies.put("Craod_token", "t", CookieOptions::default());
        manager.set_current_user(json!({"id": 1}));

        manager.sign_out().await.unwrap();

        assert!(transport.requests().is_empty());
        assert!(!manager.is_authenticated());
        assert_eq!(cookies.get("Craod_token"), None);
    }

    #[tokio::test]
    async fn test_sign_out_surfaces_server_error_after_local_cleanup() {
        let (mut manager, transport, cookies) = setup();
        put_credentials(&cookies);
        transport.push_err(AuthError::ServerError("boom".to_string()).into());

        assert!(manager.sign_out().await.is_err());

        // Local state was cleared regardless of the server outcome
        assert!(!manager.is_authenticated());
        assert_eq!(cookies.get("Craod_guid"), None);
        assert_eq!(cookies.get("Craod_token"), None);
        assert_eq!(transport.requests().len(), 1);
    }
}
