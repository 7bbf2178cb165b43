use serde::{Deserialize, Serialize};

use super::{Credential, Identity};

/// Backend view of the sessions currently open for one identity.
///
/// The server keeps `count == tokens.len()`, but the client reads both fields
/// independently and tolerates either one being absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub count: u32,
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl SessionRecord {
    pub fn contains(&self, credential: &Credential) -> bool {
        self.tokens.iter().any(|t| t == credential.as_str())
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// Response to a successful provider-token exchange or password login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: Credential,
    pub user: Identity,
}

/// Response to account creation. No session is opened by sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// One row of the registry diagnostics listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: i64,
    pub user_id: String,
    pub token: String,
}

/// Result of a registry cleanup call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearedSessions {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub cleared: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_record() {
        let json = r#"{"count": 2, "tokens": ["tok-1", "tok-2"]}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.count, 2);
        assert!(record.contains(&Credential::new("tok-1")));
        assert!(!record.contains(&Credential::new("tok-3")));
    }

    #[test]
    fn test_session_record_missing_fields_default_to_empty() {
        let record: SessionRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.count, 0);
        assert!(record.tokens.is_empty());

        let record: SessionRecord = serde_json::from_str(r#"{"count": null}"#).unwrap();
        assert_eq!(record.count, 0);
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"token":"5f2b","user":{"id":"user_1","email":"ada@example.com","name":"Ada"}}"#;
        let login: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(login.token.as_str(), "5f2b");
        assert_eq!(login.user.id, "user_1");
    }
}
