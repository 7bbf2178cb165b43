use serde::{Deserialize, Serialize};

use crate::models::Identity;

use super::Route;

/// Concurrent sessions an account may hold before the chooser is shown.
/// Inclusive: the third session is already over the limit.
pub const SESSION_LIMIT: u32 = 3;

/// Protected surfaces that run the guard when loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// "Checking sessions" page; forwards to the dashboard when within limit.
    SessionCheck,
    Dashboard,
}

impl Surface {
    pub fn route(&self) -> Route {
        match self {
            Surface::SessionCheck => Route::SessionCheck,
            Surface::Dashboard => Route::Dashboard,
        }
    }

    pub fn for_route(route: Route) -> Option<Self> {
        match route {
            Route::SessionCheck => Some(Surface::SessionCheck),
            Route::Dashboard => Some(Surface::Dashboard),
            _ => None,
        }
    }
}

/// Access decision for one evaluation of a protected surface.
///
/// Never stored: it is recomputed from the resolved identity and a live
/// session count every time a protected surface loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuardState {
    Unauthenticated,
    WithinLimit { identity: Identity, count: u32 },
    OverLimit { identity: Identity, count: u32 },
}

impl GuardState {
    /// Classify a resolved identity by its live session count.
    pub fn classify(identity: Identity, count: u32) -> Self {
        if count >= SESSION_LIMIT {
            GuardState::OverLimit { identity, count }
        } else {
            GuardState::WithinLimit { identity, count }
        }
    }

    /// State after the backend confirmed every other session was ended.
    ///
    /// Only this tab's session is assumed to remain.
    pub fn after_forced_logout(self) -> Self {
        match self {
            GuardState::OverLimit { identity, .. } | GuardState::WithinLimit { identity, .. } => {
                GuardState::WithinLimit { identity, count: 1 }
            }
            GuardState::Unauthenticated => GuardState::Unauthenticated,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            GuardState::WithinLimit { identity, .. } | GuardState::OverLimit { identity, .. } => Some(identity),
            GuardState::Unauthenticated => None,
        }
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            GuardState::WithinLimit { count, .. } | GuardState::OverLimit { count, .. } => Some(*count),
            GuardState::Unauthenticated => None,
        }
    }

    /// True when the device chooser replaces protected content.
    pub fn shows_chooser(&self) -> bool {
        matches!(self, GuardState::OverLimit { .. })
    }

    /// True when protected content may render.
    pub fn allows_content(&self) -> bool {
        matches!(self, GuardState::WithinLimit { .. })
    }
}
