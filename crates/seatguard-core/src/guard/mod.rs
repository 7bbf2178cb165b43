//! Session limit guard for protected surfaces.
//!
//! Every time a protected surface loads, the guard resolves who is signed
//! in, counts their open sessions and decides between rendering the surface,
//! showing the device chooser, or sending the user to sign in.

pub mod liveness;
pub mod machine;
pub mod navigation;
pub mod state;

pub use liveness::Liveness;
pub use machine::{ForceLogoutOutcome, GuardOutcome, SessionGuard};
pub use navigation::{ExternalRedirect, Navigation, Notice, NoticeLevel, RedirectPurpose, Route};
pub use state::{GuardState, Surface, SESSION_LIMIT};
