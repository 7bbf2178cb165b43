use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{ApiError, SessionBackend};
use crate::cache::CredentialCache;
use crate::models::Identity;

use super::{AuthError, AuthResult};

/// Works out who is signed in to this tab.
#[derive(Clone)]
pub struct IdentityResolver {
    backend: Arc<dyn SessionBackend>,
    cache: CredentialCache,
}

impl IdentityResolver {
    pub fn new(backend: Arc<dyn SessionBackend>, cache: CredentialCache) -> Self {
        Self { backend, cache }
    }

    /// The current identity, or `None` when nobody can be resolved.
    ///
    /// A cached identity wins without any network call. Otherwise the cached
    /// credential is looked up in every identity's session record and the
    /// first match is cached for the rest of the tab.
    pub async fn resolve_identity(&self) -> Option<Identity> {
        match self.try_resolve().await {
            Ok(identity) => Some(identity),
            Err(AuthError::MissingCredential) => {
                debug!("No credential cached, nobody signed in");
                None
            }
            Err(e) => {
                debug!(error = %e, "Identity resolution failed");
                None
            }
        }
    }

    async fn try_resolve(&self) -> AuthResult<Identity> {
        if let Some(identity) = self.cache.identity() {
            return Ok(identity);
        }

        let credential = self.cache.credential().ok_or(AuthError::MissingCredential)?;

        // TODO: replace this scan with a resolve-by-credential endpoint once the backend has one
        let identities = self.backend.list_identities().await?;
        debug!(identities = identities.len(), "Scanning session records for credential");

        for identity in identities {
            let record = match self.backend.session_record(&identity.id).await {
                Ok(record) => record,
                Err(e @ ApiError::Network(_)) => return Err(e.into()),
                Err(e) => {
                    warn!(identity_id = %identity.id, error = %e, "Skipping unreadable session record");
                    continue;
                }
            };

            if record.contains(&credential) {
                self.cache.store_identity(&identity);
                debug!(identity_id = %identity.id, "Credential resolved");
                return Ok(identity);
            }
        }

        Err(AuthError::ResolutionMiss)
    }
}
