//! Authentication and session management.
//!
//! This module provides:
//! - `IdentityResolver`: who is signed in to this tab
//! - `SessionCounter`: how many sessions that identity holds
//! - `SessionActions`: force-logout of other sessions and sign-out
//! - `SignInFlow`: provider callback and password sign-in
//! - `ProviderConfig`: identity provider redirects

pub mod actions;
pub mod counter;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod signin;

pub use actions::SessionActions;
pub use counter::SessionCounter;
pub use error::{AuthError, AuthResult};
pub use provider::ProviderConfig;
pub use resolver::IdentityResolver;
pub use signin::{AccessToken, CallbackFragment, SignInFlow, SignInOutcome};
