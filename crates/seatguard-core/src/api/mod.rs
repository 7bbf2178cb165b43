//! REST client module for the session registry backend.
//!
//! This module provides the `ApiClient` for talking to the backend that
//! issues credentials, lists identities and tracks open sessions, and the
//! `SessionBackend` trait the rest of the crate programs against.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::SessionBackend;
pub use client::ApiClient;
pub use error::ApiError;
