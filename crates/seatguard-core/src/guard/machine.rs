use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::auth::{IdentityResolver, SessionActions, SessionCounter};

use super::{GuardState, Liveness, Navigation, Notice, Route, Surface};

const FORCE_LOGOUT_FAILED: &str = "Could not force logout other sessions";

/// Result of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub state: GuardState,
    /// Where to go instead of rendering the surface, if anywhere.
    pub navigation: Option<Navigation>,
    pub evaluated_at: DateTime<Utc>,
}

/// Result of choosing to continue on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceLogoutOutcome {
    pub state: GuardState,
    pub notice: Option<Notice>,
}

/// Decides whether a protected surface may render.
#[derive(Clone)]
pub struct SessionGuard {
    resolver: IdentityResolver,
    counter: SessionCounter,
    actions: SessionActions,
    verify_after_force_logout: bool,
}

impl SessionGuard {
    pub fn new(resolver: IdentityResolver, counter: SessionCounter, actions: SessionActions) -> Self {
        Self {
            resolver,
            counter,
            actions,
            verify_after_force_logout: false,
        }
    }

    /// Re-count after a successful force-logout and warn on a mismatch.
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify_after_force_logout = enabled;
        self
    }

    /// Evaluate `surface` for the current tab.
    ///
    /// Returns `None` when `liveness` was torn down before the evaluation
    /// finished; the caller must then apply nothing.
    pub async fn evaluate(&self, surface: Surface, liveness: &Liveness) -> Option<GuardOutcome> {
        let identity = self.resolver.resolve_identity().await;
        if !liveness.is_live() {
            debug!(?surface, "Surface torn down during identity resolution");
            return None;
        }

        let Some(identity) = identity else {
            debug!(?surface, "Unauthenticated, redirecting to sign-in");
            return Some(GuardOutcome {
                state: GuardState::Unauthenticated,
                navigation: Some(Navigation::Replace(Route::SignIn)),
                evaluated_at: Utc::now(),
            });
        };

        let count = self.counter.count_sessions(&identity.id).await;
        if !liveness.is_live() {
            debug!(?surface, "Surface torn down during session count");
            return None;
        }

        let state = GuardState::classify(identity, count);
        let navigation = match (&state, surface) {
            (GuardState::WithinLimit { .. }, Surface::SessionCheck) => Some(Navigation::Replace(Route::Dashboard)),
            _ => None,
        };

        if state.shows_chooser() {
            info!(count, "Session limit reached, showing device chooser");
        } else {
            debug!(count, ?surface, "Within session limit");
        }

        Some(GuardOutcome {
            state,
            navigation,
            evaluated_at: Utc::now(),
        })
    }

    /// Force-logout every other session and continue on this device.
    ///
    /// On success the count is taken to be one without re-querying, unless
    /// verification is enabled. On failure `state` is returned unchanged
    /// with an error notice.
    pub async fn continue_here(&self, state: GuardState) -> ForceLogoutOutcome {
        let Some(identity_id) = state.identity().map(|i| i.id.clone()) else {
            return ForceLogoutOutcome { state, notice: None };
        };

        if !self.actions.force_logout_others(&identity_id).await {
            return ForceLogoutOutcome {
                state,
                notice: Some(Notice::error(FORCE_LOGOUT_FAILED)),
            };
        }

        let state = state.after_forced_logout();
        if !self.verify_after_force_logout {
            return ForceLogoutOutcome { state, notice: None };
        }

        let remaining = self.counter.count_sessions(&identity_id).await;
        let notice = if remaining == 1 {
            None
        } else {
            warn!(remaining, "Session count after force logout differs from expected");
            Some(Notice::warning(format!(
                "Other sessions were logged out, but {remaining} sessions are still reported"
            )))
        };
        ForceLogoutOutcome { state, notice }
    }

    pub fn actions(&self) -> &SessionActions {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::ProviderConfig;
    use crate::cache::CredentialCache;
    use crate::guard::NoticeLevel;
    use crate::models::Credential;
    use crate::test_support::{identity, record, FakeBackend};

    fn guard(backend: Arc<FakeBackend>, cache: &CredentialCache) -> SessionGuard {
        SessionGuard::new(
            IdentityResolver::new(backend.clone(), cache.clone()),
            SessionCounter::new(backend.clone()),
            SessionActions::new(backend, cache.clone(), ProviderConfig::default(), "http://localhost:3000"),
        )
    }

    fn cache_with_credential(token: &str) -> CredentialCache {
        let cache = CredentialCache::in_memory();
        cache.store_credential(&Credential::new(token));
        cache
    }

    #[tokio::test]
    async fn test_fresh_tab_within_limit_resolves_and_forwards() {
        let backend = Arc::new(FakeBackend::new().with_identity(identity("u1"), record(2, &["tok-1"])));
        let cache = cache_with_credential("tok-1");

        let outcome = guard(backend, &cache)
            .evaluate(Surface::SessionCheck, &Liveness::mounted())
            .await
            .expect("live evaluation");

        assert_eq!(outcome.state, GuardState::WithinLimit { identity: identity("u1"), count: 2 });
        assert!(!outcome.state.shows_chooser());
        assert_eq!(outcome.navigation, Some(Navigation::Replace(Route::Dashboard)));
        assert_eq!(cache.identity(), Some(identity("u1")));
    }

    #[tokio::test]
    async fn test_over_limit_then_continue_here() {
        let backend = Arc::new(FakeBackend::new().with_identity(identity("u1"), record(4, &["tok-1", "a", "b", "c"])));
        let cache = cache_with_credential("tok-1");
        let guard = guard(backend.clone(), &cache);

        let outcome = guard
            .evaluate(Surface::SessionCheck, &Liveness::mounted())
            .await
            .expect("live evaluation");
        assert!(outcome.state.shows_chooser());
        assert_eq!(outcome.navigation, None);

        let continued = guard.continue_here(outcome.state).await;
        assert_eq!(continued.state, GuardState::WithinLimit { identity: identity("u1"), count: 1 });
        assert_eq!(continued.notice, None);
        assert_eq!(backend.calls().last().map(String::as_str), Some("POST /force_logout"));
    }

    #[tokio::test]
    async fn test_dashboard_within_limit_stays() {
        let backend = Arc::new(FakeBackend::new().with_identity(identity("u1"), record(1, &["tok-1"])));
        let cache = CredentialCache::in_memory();
        cache.store_session(&Credential::new("tok-1"), &identity("u1"));

        let outcome = guard(backend.clone(), &cache)
            .evaluate(Surface::Dashboard, &Liveness::mounted())
            .await
            .expect("live evaluation");

        assert!(outcome.state.allows_content());
        assert_eq!(outcome.navigation, None);
        assert_eq!(backend.calls(), vec!["GET /sessions/u1"]);
    }

    #[tokio::test]
    async fn test_no_credential_redirects_to_sign_in() {
        let backend = Arc::new(FakeBackend::new());
        let cache = CredentialCache::in_memory();

        let outcome = guard(backend.clone(), &cache)
            .evaluate(Surface::Dashboard, &Liveness::mounted())
            .await
            .expect("live evaluation");

        assert_eq!(outcome.state, GuardState::Unauthenticated);
        assert_eq!(outcome.navigation, Some(Navigation::Replace(Route::SignIn)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_count_failure_fails_open() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_identity(identity("u1"), record(7, &["tok-1"]))
                .failing_record("u1"),
        );
        let cache = CredentialCache::in_memory();
        cache.store_session(&Credential::new("tok-1"), &identity("u1"));

        let outcome = guard(backend, &cache)
            .evaluate(Surface::Dashboard, &Liveness::mounted())
            .await
            .expect("live evaluation");

        assert_eq!(outcome.state, GuardState::WithinLimit { identity: identity("u1"), count: 0 });
    }

    #[tokio::test]
    async fn test_torn_down_surface_yields_nothing() {
        let backend = Arc::new(FakeBackend::new().with_identity(identity("u1"), record(4, &["tok-1"])));
        let cache = cache_with_credential("tok-1");
        let liveness = Liveness::mounted();
        liveness.tear_down();

        let outcome = guard(backend, &cache).evaluate(Surface::SessionCheck, &liveness).await;
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_continue_here_failure_keeps_chooser() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_identity(identity("u1"), record(5, &["tok-1"]))
                .rejecting_force_logout(),
        );
        let cache = cache_with_credential("tok-1");
        let state = GuardState::classify(identity("u1"), 5);

        let continued = guard(backend, &cache).continue_here(state.clone()).await;

        assert_eq!(continued.state, state);
        let notice = continued.notice.expect("error notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, FORCE_LOGOUT_FAILED);
    }

    #[tokio::test]
    async fn test_verification_warns_on_mismatch() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_identity(identity("u1"), record(5, &["tok-1", "a", "b", "c", "d"]))
                .force_logout_leaves(2),
        );
        let cache = cache_with_credential("tok-1");
        let guard = guard(backend, &cache).with_verification(true);

        let continued = guard.continue_here(GuardState::classify(identity("u1"), 5)).await;

        assert_eq!(continued.state.count(), Some(1));
        assert_eq!(continued.notice.map(|n| n.level), Some(NoticeLevel::Warning));
    }

    #[tokio::test]
    async fn test_verification_quiet_when_one_remains() {
        let backend = Arc::new(FakeBackend::new().with_identity(identity("u1"), record(3, &["tok-1", "a", "b"])));
        let cache = cache_with_credential("tok-1");
        let guard = guard(backend.clone(), &cache).with_verification(true);

        let continued = guard.continue_here(GuardState::classify(identity("u1"), 3)).await;

        assert!(continued.state.allows_content());
        assert_eq!(continued.notice, None);
        assert_eq!(backend.calls(), vec!["POST /force_logout", "GET /sessions/u1"]);
    }
}
