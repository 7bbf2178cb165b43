use async_trait::async_trait;

use crate::models::{Credential, Identity, LoginResponse, SessionRecord};

use super::ApiError;

/// Calls the session guard and its actions make against the session registry.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Exchange a provider-issued access token for a credential and identity.
    async fn exchange_provider_token(&self, access_token: &str) -> Result<LoginResponse, ApiError>;

    /// Exchange an email and password for a credential and identity.
    async fn login_with_password(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Invalidate one credential server-side.
    async fn logout(&self, credential: &Credential) -> Result<(), ApiError>;

    /// Invalidate every session of an identity but one.
    async fn force_logout(&self, identity_id: &str) -> Result<(), ApiError>;

    /// List every identity known to the registry.
    async fn list_identities(&self) -> Result<Vec<Identity>, ApiError>;

    /// Fetch the session record of one identity.
    async fn session_record(&self, identity_id: &str) -> Result<SessionRecord, ApiError>;
}
