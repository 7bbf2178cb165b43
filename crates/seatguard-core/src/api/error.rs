use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Backend { status: StatusCode, body: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return ApiError::RateLimited;
        }
        ApiError::Backend {
            status,
            body: Self::truncate_body(body),
        }
    }

    /// Status code of a non-2xx response, if this error came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            ApiError::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Text suitable for a user-facing notice.
    ///
    /// Backend rejections carry the server's own message, preferring the
    /// `detail` field of a JSON error body.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Network(_) => "Network error".to_string(),
            ApiError::Backend { body, .. } => {
                let detail = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
                match detail {
                    Some(detail) if !detail.is_empty() => detail,
                    _ if !body.trim().is_empty() => body.clone(),
                    _ => fallback.to_string(),
                }
            }
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_rate_limit() {
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
    }

    #[test]
    fn test_from_status_truncates_long_bodies() {
        let body = "x".repeat(2000);
        match ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            ApiError::Backend { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.contains("truncated, 2000 total bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail":"Invalid Auth0 token"}"#);
        assert_eq!(err.user_message("Auth0 login failed"), "Invalid Auth0 token");
    }

    #[test]
    fn test_user_message_falls_back_on_empty_body() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.user_message("Auth0 login failed"), "Auth0 login failed");

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.user_message("Auth0 login failed"), "upstream down");
    }
}
