//! Data models shared between the backend client, the credential cache and
//! the session guard.
//!
//! - `Identity`: the account record the backend returns for a user
//! - `Credential`: the opaque bearer token for one client session
//! - `SessionRecord`: the backend's view of all sessions for an identity
//! - `LoginResponse`: the result of exchanging a provider token or password

pub mod credential;
pub mod identity;
pub mod session;

pub use credential::Credential;
pub use identity::Identity;
pub use session::{ClearedSessions, LoginResponse, RegistryEntry, SessionRecord, SignupResponse};
