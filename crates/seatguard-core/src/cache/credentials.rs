use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{Credential, Identity};

use super::{MemoryTabStorage, TabStorage};

/// Storage key for the bearer credential
pub const CREDENTIAL_KEY: &str = "seatguard_token";

/// Storage key for the serialized identity record
pub const IDENTITY_KEY: &str = "seatguard_user";

/// The current tab's credential and cached identity.
///
/// Clone is cheap and every clone sees the same storage.
#[derive(Clone)]
pub struct CredentialCache {
    storage: Arc<dyn TabStorage>,
}

impl CredentialCache {
    /// Start a tab over the given storage.
    pub fn open(storage: Arc<dyn TabStorage>) -> Self {
        debug!("Credential cache opened");
        Self { storage }
    }

    /// Start a tab over fresh in-process storage.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryTabStorage::new()))
    }

    pub fn credential(&self) -> Option<Credential> {
        self.storage
            .get(CREDENTIAL_KEY)
            .filter(|t| !t.is_empty())
            .map(Credential::new)
    }

    pub fn store_credential(&self, credential: &Credential) {
        self.storage.set(CREDENTIAL_KEY, credential.as_str().to_string());
    }

    /// The cached identity, if one was stored and still parses.
    pub fn identity(&self) -> Option<Identity> {
        let raw = self.storage.get(IDENTITY_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached identity");
                None
            }
        }
    }

    pub fn store_identity(&self, identity: &Identity) {
        match serde_json::to_string(identity) {
            Ok(raw) => self.storage.set(IDENTITY_KEY, raw),
            Err(e) => warn!(error = %e, "Failed to serialize identity for cache"),
        }
    }

    /// Persist the result of a successful sign-in.
    pub fn store_session(&self, credential: &Credential, identity: &Identity) {
        self.store_credential(credential);
        self.store_identity(identity);
        debug!(identity_id = %identity.id, "Session stored in credential cache");
    }

    /// Forget the credential and the identity.
    pub fn clear(&self) {
        self.storage.remove(CREDENTIAL_KEY);
        self.storage.remove(IDENTITY_KEY);
        debug!("Credential cache cleared");
    }

    pub fn is_empty(&self) -> bool {
        self.storage.get(CREDENTIAL_KEY).is_none() && self.storage.get(IDENTITY_KEY).is_none()
    }

    /// Tear the tab down. Nothing survives.
    pub fn close(self) {
        self.storage.clear();
        debug!("Credential cache closed");
    }
}
