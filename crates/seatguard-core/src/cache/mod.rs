//! Tab-scoped caching of the current session.
//!
//! This module provides the `CredentialCache`, which holds the bearer
//! credential and the resolved identity for the lifetime of one client tab,
//! and the `TabStorage` trait it is layered on.
//!
//! Cached values:
//! - the credential string
//! - the identity record, serialized as JSON

pub mod credentials;
pub mod storage;

pub use credentials::{CredentialCache, CREDENTIAL_KEY, IDENTITY_KEY};
pub use storage::{MemoryTabStorage, TabStorage};
