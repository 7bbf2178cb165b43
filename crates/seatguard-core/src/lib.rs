//! Core library for seatguard.
//!
//! Enforces a limit on concurrent sessions per account from the client
//! side. A signed-in tab resolves its identity, counts the identity's open
//! sessions in the backend registry, and is blocked behind a device chooser
//! once the count reaches the limit.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod guard;
pub mod models;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiClient, ApiError, SessionBackend};
pub use auth::{AuthError, IdentityResolver, SessionActions, SessionCounter, SignInFlow};
pub use cache::CredentialCache;
pub use config::Config;
pub use guard::{GuardOutcome, GuardState, Liveness, SessionGuard, Surface, SESSION_LIMIT};
pub use models::{Credential, Identity};
