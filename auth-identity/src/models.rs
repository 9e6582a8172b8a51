use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A registered account as exposed by every read path.
///
/// The password hash is deliberately absent; see [`UserCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with the stored hash, only produced for password checks
#[derive(Debug)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: SecretString,
}

/// Insert payload for the credential store
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    /// Already normalised (trimmed, lower-cased)
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Partial update for [`crate::repository::UserRepository::update`]
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Server-side record of one outstanding refresh token.
///
/// `token` holds the digest of the refresh token, never the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Public profile returned by who-am-i
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

// Request payloads. Missing fields deserialize to empty strings so validation
// can report them alongside every other field error.

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &logger_redacted::redact_email(&self.email))
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &logger_redacted::redact_email(&self.email))
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of both refresh and logout
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Canonical form used for lookup and storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: RegisterRequest = serde_json::from_str(r#"{"name":"Amr"}"#).unwrap();
        assert_eq!(request.name, "Amr");
        assert!(request.email.is_empty());
        assert!(request.password.is_empty());
    }

    #[test]
    fn test_debug_never_prints_secrets() {
        let request = LoginRequest {
            email: "amr@example.com".to_string(),
            password: "P@ss1234".to_string(),
        };
        let printed = format!("{request:?}");
        assert!(!printed.contains("P@ss1234"));
        assert!(!printed.contains("amr@example.com"));

        let pair = TokenPair {
            access_token: "access-value".to_string(),
            refresh_token: "refresh-value".to_string(),
        };
        let printed = format!("{pair:?}");
        assert!(!printed.contains("access-value"));
        assert!(!printed.contains("refresh-value"));
    }

    #[test]
    fn test_profile_from_user() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Amr".to_string(),
            email: "amr@example.com".to_string(),
            created_at: now,
            updated_at: now,
        };
        let profile = UserProfile::from(user.clone());
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.email, "amr@example.com");

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Amr@Example.COM "), "amr@example.com");
    }
}
