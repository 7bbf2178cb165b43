//! In-process stand-in for the session registry, used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::{ApiError, SessionBackend};
use crate::models::{Credential, Identity, LoginResponse, SessionRecord};

pub(crate) fn identity(id: &str) -> Identity {
    Identity {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        name: id.to_uppercase(),
    }
}

pub(crate) fn record(count: u32, tokens: &[&str]) -> SessionRecord {
    SessionRecord {
        count,
        tokens: tokens.iter().map(|t| t.to_string()).collect(),
    }
}

/// A transport-level failure, built without touching the network.
pub(crate) fn network_error() -> ApiError {
    let err = reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("an unparseable URL never builds");
    ApiError::Network(err)
}

#[derive(Default)]
struct FakeState {
    identities: Vec<Identity>,
    records: HashMap<String, SessionRecord>,
    failing_records: HashSet<String>,
    offline: bool,
    login: Option<LoginResponse>,
    login_rejection: Option<(StatusCode, String)>,
    force_logout_rejected: bool,
    force_logout_leaves: Option<u32>,
    logout_rejected: bool,
    calls: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub(crate) fn with_identity(self, identity: Identity, record: SessionRecord) -> Self {
        self.with(|s| {
            s.records.insert(identity.id.clone(), record);
            s.identities.push(identity);
        })
    }

    /// Every call fails as if the backend were unreachable.
    pub(crate) fn offline(self) -> Self {
        self.with(|s| s.offline = true)
    }

    /// `GET /sessions/{id}` answers 500 for this identity.
    pub(crate) fn failing_record(self, identity_id: &str) -> Self {
        self.with(|s| {
            s.failing_records.insert(identity_id.to_string());
        })
    }

    pub(crate) fn with_login(self, credential: &str, identity: Identity) -> Self {
        self.with(|s| {
            s.login = Some(LoginResponse {
                token: Credential::new(credential),
                user: identity,
            })
        })
    }

    pub(crate) fn rejecting_login(self, status: StatusCode, body: &str) -> Self {
        self.with(|s| s.login_rejection = Some((status, body.to_string())))
    }

    pub(crate) fn rejecting_force_logout(self) -> Self {
        self.with(|s| s.force_logout_rejected = true)
    }

    /// Successful force-logout leaves `count` sessions instead of one.
    pub(crate) fn force_logout_leaves(self, count: u32) -> Self {
        self.with(|s| s.force_logout_leaves = Some(count))
    }

    pub(crate) fn rejecting_logout(self) -> Self {
        self.with(|s| s.logout_rejected = true)
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn session_count(&self, identity_id: &str) -> Option<u32> {
        self.state.lock().unwrap().records.get(identity_id).map(|r| r.count)
    }

    /// Record the call and fail it if the backend is offline.
    fn enter(&self, call: String) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.offline {
            return Err(network_error());
        }
        Ok(state)
    }

    fn issue_login(state: &FakeState) -> Result<LoginResponse, ApiError> {
        if let Some((status, body)) = &state.login_rejection {
            return Err(ApiError::from_status(*status, body));
        }
        state
            .login
            .clone()
            .ok_or_else(|| ApiError::from_status(StatusCode::UNAUTHORIZED, ""))
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn exchange_provider_token(&self, _access_token: &str) -> Result<LoginResponse, ApiError> {
        let state = self.enter("POST /login_with_auth0".to_string())?;
        Self::issue_login(&state)
    }

    async fn login_with_password(&self, _email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        let state = self.enter("POST /login".to_string())?;
        Self::issue_login(&state)
    }

    async fn logout(&self, credential: &Credential) -> Result<(), ApiError> {
        let mut state = self.enter("POST /logout".to_string())?;
        if state.logout_rejected {
            return Err(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""));
        }
        for record in state.records.values_mut() {
            record.tokens.retain(|t| t != credential.as_str());
            record.count = record.tokens.len() as u32;
        }
        Ok(())
    }

    async fn force_logout(&self, identity_id: &str) -> Result<(), ApiError> {
        let mut state = self.enter("POST /force_logout".to_string())?;
        if state.force_logout_rejected {
            return Err(ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail":"Missing user_id"}"#));
        }
        let leaves = state.force_logout_leaves.unwrap_or(1);
        if let Some(record) = state.records.get_mut(identity_id) {
            record.tokens.truncate(leaves as usize);
            record.count = leaves;
        }
        Ok(())
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, ApiError> {
        let state = self.enter("GET /users".to_string())?;
        Ok(state.identities.clone())
    }

    async fn session_record(&self, identity_id: &str) -> Result<SessionRecord, ApiError> {
        let state = self.enter(format!("GET /sessions/{identity_id}"))?;
        if state.failing_records.contains(identity_id) {
            return Err(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""));
        }
        state
            .records
            .get(identity_id)
            .cloned()
            .ok_or_else(|| ApiError::from_status(StatusCode::NOT_FOUND, ""))
    }
}
