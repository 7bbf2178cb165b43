//! API client for the session registry backend.
//!
//! This module provides the `ApiClient` struct, the production
//! implementation of `SessionBackend`, plus the registry maintenance calls
//! used by the command-line diagnostics.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::models::{
    ClearedSessions, Credential, Identity, LoginResponse, RegistryEntry, SessionRecord,
    SignupResponse,
};

use super::{ApiError, SessionBackend};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Every call the guard makes sits in front of a screen, so fail fast.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 500;

/// API client for the session registry.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client for the backend at `base_url`
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidResponse(format!(
                "{} cannot be used as an API base URL",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // new() rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request, backing off and retrying while the server answers 429.
    async fn send<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build().send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RATE_LIMIT_RETRIES {
                retries += 1;
                warn!(url = %response.url(), retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2; // Exponential backoff
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, "Backend rejected request");
            return Err(ApiError::from_status(status, &body));
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().clone();
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} from {}", e, url.path())))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.send(|| self.client.get(url.clone())).await?;
        Self::read_json(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: Url, body: &B) -> Result<T, ApiError> {
        let response = self.send(|| self.client.post(url.clone()).json(body)).await?;
        Self::read_json(response).await
    }

    /// POST where only the status matters.
    async fn post_status<B: Serialize>(&self, url: Url, body: &B) -> Result<(), ApiError> {
        self.send(|| self.client.post(url.clone()).json(body)).await?;
        Ok(())
    }

    // ===== Account and registry maintenance =====

    /// Create an account. No session is opened.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<SignupResponse, ApiError> {
        let body = json!({ "email": email, "password": password, "name": name });
        self.post(self.endpoint(&["signup"]), &body).await
    }

    /// List every open session in the registry.
    pub async fn registry_entries(&self) -> Result<Vec<RegistryEntry>, ApiError> {
        self.get(self.endpoint(&["debug", "sessions"])).await
    }

    /// Remove every session of one identity, including the caller's.
    pub async fn clear_identity_sessions(&self, identity_id: &str) -> Result<ClearedSessions, ApiError> {
        let body = json!({ "user_id": identity_id });
        self.post(self.endpoint(&["debug", "clear_user_sessions"]), &body).await
    }

    /// Remove every session in the registry.
    pub async fn clear_all_sessions(&self) -> Result<ClearedSessions, ApiError> {
        self.post(self.endpoint(&["debug", "clear_all_sessions"]), &json!({})).await
    }
}

#[async_trait]
impl SessionBackend for ApiClient {
    async fn exchange_provider_token(&self, access_token: &str) -> Result<LoginResponse, ApiError> {
        let body = json!({ "token": access_token });
        self.post(self.endpoint(&["login_with_auth0"]), &body).await
    }

    async fn login_with_password(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = json!({ "email": email, "password": password });
        self.post(self.endpoint(&["login"]), &body).await
    }

    async fn logout(&self, credential: &Credential) -> Result<(), ApiError> {
        let body = json!({ "token": credential.as_str() });
        self.post_status(self.endpoint(&["logout"]), &body).await
    }

    async fn force_logout(&self, identity_id: &str) -> Result<(), ApiError> {
        let body = json!({ "user_id": identity_id });
        self.post_status(self.endpoint(&["force_logout"]), &body).await
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, ApiError> {
        self.get(self.endpoint(&["users"])).await
    }

    async fn session_record(&self, identity_id: &str) -> Result<SessionRecord, ApiError> {
        self.get(self.endpoint(&["sessions", identity_id])).await
    }
}
