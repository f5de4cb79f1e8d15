//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub registered_on: DateTime<Utc>,
    /// Deactivated accounts cannot log in and lose their sessions
    pub active: bool,
}

impl User {
    /// Check if the account may hold a session
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Path of the account's profile page
    pub fn profile_path(&self) -> String {
        format!("{}{}", crate::config::PROFILE_PATH_PREFIX, self.id)
    }
}

/// Registration input, before the password is hashed.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl NewUser {
    /// Build a registration with the email lowercased and both
    /// identifiers trimmed.
    pub fn new(email: &str, username: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_lowercase(),
            username: username.trim().to_string(),
            password: password.to_string(),
        }
    }
}

// Keep the plain-text password out of logs
impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_identifiers() {
        let new_user = NewUser::new("  Alice@Example.COM ", " alice ", " secret ");
        assert_eq!(new_user.email, "alice@example.com");
        assert_eq!(new_user.username, "alice");
        // Passwords are taken verbatim
        assert_eq!(new_user.password, " secret ");
    }

    #[test]
    fn test_new_user_debug_hides_password() {
        let printed = format!("{:?}", NewUser::new("a@b.io", "abc", "hunter22"));
        assert!(!printed.contains("hunter22"));
    }

    #[test]
    fn test_serialization_skips_hash() {
        let user = User {
            id: 7,
            email: "ann@example.com".into(),
            username: "ann".into(),
            password_hash: "$argon2id$secret".into(),
            registered_on: Utc::now(),
            active: true,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert_eq!(user.profile_path(), "/auth/profile/7");
    }
}
