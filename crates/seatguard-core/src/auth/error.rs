//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Failures inside the resolver, counter, actions and sign-in flow.
///
/// None of these cross a public operation boundary: each operation turns
/// them into its safe default (`None`, `false` or `0`).
#[derive(Error, Debug)]
pub enum AuthError {
    /// Transport failure talking to the backend
    #[error("Network failure: {0}")]
    Network(ApiError),

    /// Backend answered with a non-2xx status or an unreadable body
    #[error("Backend error: {0}")]
    Backend(ApiError),

    /// No credential in the cache or no token in the callback fragment
    #[error("Missing credential")]
    MissingCredential,

    /// A credential is cached but no session record contains it
    #[error("Credential not found in any session record")]
    ResolutionMiss,

    /// Misconfigured provider or origin address
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        if err.is_network() {
            AuthError::Network(err)
        } else {
            AuthError::Backend(err)
        }
    }
}

impl AuthError {
    /// Message for a blocking notice, with `fallback` for errors that carry
    /// no text of their own.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AuthError::Network(_) => "Network error".to_string(),
            AuthError::Backend(e) => e.user_message(fallback),
            _ => fallback.to_string(),
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_errors_are_backend_errors() {
        let err: AuthError = ApiError::from_status(StatusCode::BAD_REQUEST, "Missing user_id").into();
        assert!(matches!(err, AuthError::Backend(_)));
        assert_eq!(err.user_message("fallback"), "Missing user_id");
    }

    #[test]
    fn test_invalid_response_is_backend_error() {
        let err: AuthError = ApiError::InvalidResponse("expected array".to_string()).into();
        assert!(matches!(err, AuthError::Backend(_)));
        assert_eq!(err.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_missing_credential_uses_fallback() {
        assert_eq!(AuthError::MissingCredential.user_message("Sign in again"), "Sign in again");
    }
}
