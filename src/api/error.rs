use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing credentials - guid or token cookie is not set")]
    MissingCredentials,

    #[error("Unauthorized - credentials were rejected")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl AuthError {
    /// Truncate a response body to avoid carrying excessive data in errors
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => AuthError::Unauthorized,
            403 => AuthError::AccessDenied(truncated),
            404 => AuthError::NotFound(truncated),
            500..=599 => AuthError::ServerError(truncated),
            _ => AuthError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True for the local fast-rejection raised before any transport call.
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, AuthError::MissingCredentials)
    }
}
