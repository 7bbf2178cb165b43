use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::SessionBackend;
use crate::cache::CredentialCache;
use crate::guard::{ExternalRedirect, RedirectPurpose};

use super::ProviderConfig;

/// Destructive session operations offered to the user.
#[derive(Clone)]
pub struct SessionActions {
    backend: Arc<dyn SessionBackend>,
    cache: CredentialCache,
    provider: ProviderConfig,
    origin: String,
}

impl SessionActions {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        cache: CredentialCache,
        provider: ProviderConfig,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            cache,
            provider,
            origin: origin.into(),
        }
    }

    /// Ask the backend to end every session of `identity_id` but one.
    ///
    /// Returns `true` only when the backend confirmed.
    pub async fn force_logout_others(&self, identity_id: &str) -> bool {
        match self.backend.force_logout(identity_id).await {
            Ok(()) => {
                info!(identity_id = %identity_id, "Other sessions logged out");
                true
            }
            Err(e) => {
                warn!(identity_id = %identity_id, error = %e, "Force logout failed");
                false
            }
        }
    }

    /// Sign this tab out.
    ///
    /// The backend call is best-effort. The cache is cleared whatever the
    /// backend says, and the provider logout redirect is produced whatever
    /// happened before it, so the next sign-in needs fresh authorization.
    pub async fn logout_current(&self) -> Option<ExternalRedirect> {
        if let Some(credential) = self.cache.credential() {
            if let Err(e) = self.backend.logout(&credential).await {
                warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        } else {
            debug!("No credential cached, skipping backend logout");
        }

        self.cache.clear();

        match self.provider.logout_url(&self.origin) {
            Ok(Some(url)) => Some(ExternalRedirect {
                purpose: RedirectPurpose::ProviderLogout,
                url,
            }),
            Ok(None) => {
                debug!("Provider not configured, skipping provider logout");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not build provider logout address");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credential;
    use crate::test_support::{identity, record, FakeBackend};

    fn configured_provider() -> ProviderConfig {
        ProviderConfig {
            client_id: "client-1".to_string(),
            ..ProviderConfig::default()
        }
    }

    fn signed_in_cache() -> CredentialCache {
        let cache = CredentialCache::in_memory();
        cache.store_session(&Credential::new("tok-1"), &identity("u1"));
        cache
    }

    #[tokio::test]
    async fn test_force_logout_success() {
        let backend = Arc::new(FakeBackend::new().with_identity(identity("u1"), record(4, &["tok-1", "a", "b", "c"])));
        let actions = SessionActions::new(backend.clone(), signed_in_cache(), configured_provider(), "http://localhost:3000");

        assert!(actions.force_logout_others("u1").await);
        assert_eq!(backend.session_count("u1"), Some(1));
    }

    #[tokio::test]
    async fn test_force_logout_rejected() {
        let backend = Arc::new(FakeBackend::new().rejecting_force_logout());
        let actions = SessionActions::new(backend, signed_in_cache(), configured_provider(), "http://localhost:3000");

        assert!(!actions.force_logout_others("u1").await);
    }

    #[tokio::test]
    async fn test_force_logout_network_failure() {
        let backend = Arc::new(FakeBackend::new().offline());
        let actions = SessionActions::new(backend, signed_in_cache(), configured_provider(), "http://localhost:3000");

        assert!(!actions.force_logout_others("u1").await);
    }

    #[tokio::test]
    async fn test_logout_clears_cache_and_redirects_to_provider() {
        let backend = Arc::new(FakeBackend::new().with_identity(identity("u1"), record(2, &["tok-1", "tok-2"])));
        let cache = signed_in_cache();
        let actions = SessionActions::new(backend.clone(), cache.clone(), configured_provider(), "http://localhost:3000");

        let redirect = actions.logout_current().await.expect("provider logout redirect");

        assert!(cache.is_empty());
        assert_eq!(redirect.purpose, RedirectPurpose::ProviderLogout);
        assert_eq!(redirect.url.path(), "/v2/logout");
        assert_eq!(backend.calls(), vec!["POST /logout"]);
        assert_eq!(backend.session_count("u1"), Some(1));
    }

    #[tokio::test]
    async fn test_logout_network_failure_still_clears_cache() {
        let backend = Arc::new(FakeBackend::new().offline());
        let cache = signed_in_cache();
        let actions = SessionActions::new(backend, cache.clone(), configured_provider(), "http://localhost:3000");

        let redirect = actions.logout_current().await;

        assert!(cache.credential().is_none());
        assert!(cache.identity().is_none());
        assert!(redirect.is_some(), "provider logout must still be attempted");
    }

    #[tokio::test]
    async fn test_logout_backend_rejection_still_clears_cache() {
        let backend = Arc::new(FakeBackend::new().rejecting_logout());
        let cache = signed_in_cache();
        let actions = SessionActions::new(backend, cache.clone(), configured_provider(), "http://localhost:3000");

        actions.logout_current().await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_logout_without_credential_skips_backend() {
        let backend = Arc::new(FakeBackend::new());
        let cache = CredentialCache::in_memory();
        cache.store_identity(&identity("u1"));
        let actions = SessionActions::new(backend.clone(), cache.clone(), configured_provider(), "http://localhost:3000");

        actions.logout_current().await;

        assert!(backend.calls().is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_logout_without_client_id_has_no_provider_redirect() {
        let backend = Arc::new(FakeBackend::new());
        let cache = signed_in_cache();
        let actions = SessionActions::new(backend, cache.clone(), ProviderConfig::default(), "http://localhost:3000");

        assert!(actions.logout_current().await.is_none());
        assert!(cache.is_empty());
    }
}
