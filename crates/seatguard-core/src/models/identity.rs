use serde::{Deserialize, Serialize};

/// One account as known to the session registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl Identity {
    /// Name to greet the user with, falling back to the email local part.
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            &self.name
        } else {
            self.email.split('@').next().unwrap_or(&self.email)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_name() {
        let identity = Identity {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        };
        assert_eq!(identity.display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let identity = Identity {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            name: "  ".to_string(),
        };
        assert_eq!(identity.display_name(), "ada");
    }

    #[test]
    fn test_parse_users_response() {
        let json = r#"[{"id":"user_1a2b3c4d","email":"ada@example.com","name":"Ada"},{"id":"user_9f8e7d6c","email":"bob@example.com","name":"bob"}]"#;
        let users: Vec<Identity> = serde_json::from_str(json).expect("users should parse");
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].id, "user_9f8e7d6c");
    }
}
