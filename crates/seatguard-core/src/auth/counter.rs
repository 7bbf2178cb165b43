use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::SessionBackend;

/// Counts the open sessions of an identity.
#[derive(Clone)]
pub struct SessionCounter {
    backend: Arc<dyn SessionBackend>,
}

impl SessionCounter {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self { backend }
    }

    /// Number of open sessions, or `0` when the registry cannot be read.
    ///
    /// A failed count never blocks access; it only fails to detect an
    /// over-limit account.
    pub async fn count_sessions(&self, identity_id: &str) -> u32 {
        match self.backend.session_record(identity_id).await {
            Ok(record) => {
                debug!(identity_id = %identity_id, count = record.count, "Sessions counted");
                record.count
            }
            Err(e) => {
                warn!(identity_id = %identity_id, error = %e, "Session count unavailable, assuming none");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{identity, record, FakeBackend};

    #[tokio::test]
    async fn test_counts_from_record() {
        let backend = Arc::new(FakeBackend::new().with_identity(identity("u1"), record(4, &["a", "b", "c", "d"])));
        assert_eq!(SessionCounter::new(backend).count_sessions("u1").await, 4);
    }

    #[tokio::test]
    async fn test_unknown_identity_counts_zero() {
        let backend = Arc::new(FakeBackend::new());
        assert_eq!(SessionCounter::new(backend).count_sessions("nobody").await, 0);
    }

    #[tokio::test]
    async fn test_backend_failure_counts_zero() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_identity(identity("u1"), record(5, &["a"]))
                .failing_record("u1"),
        );
        assert_eq!(SessionCounter::new(backend).count_sessions("u1").await, 0);
    }

    #[tokio::test]
    async fn test_network_failure_counts_zero() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_identity(identity("u1"), record(5, &["a"]))
                .offline(),
        );
        assert_eq!(SessionCounter::new(backend).count_sessions("u1").await, 0);
    }
}
