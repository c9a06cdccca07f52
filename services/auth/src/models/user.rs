//! User model and related functionality

use chrono::{DateTime, Utc};
use common::principal::{Principal, Role};
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// User entity as persisted in the users document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Argon2 PHC string. Never leaves the auth crate.
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// User as returned to callers, without the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login: user.last_login,
        }
    }
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Plaintext; hashed by the repository before it is stored
    pub password: String,
    pub role: Role,
}

/// User update payload. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    /// Plaintext; re-hashed before the merge
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Registration request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
    pub register_key: Option<String>,
}

/// User login credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginCredentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Self-service profile update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Aggregate user counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub admins: usize,
    pub regular_users: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_never_carries_password() {
        let user = User {
            id: 3,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::User,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            last_login: None,
        };

        let value = serde_json::to_value(UserProfile::from(user)).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["username"], "alice");
        assert_eq!(value["isActive"], true);
        assert!(value["lastLogin"].is_null());
    }

    #[test]
    fn test_reads_stored_record_with_defaults() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "username": "admin",
            "password": "hash",
            "createdAt": "2024-01-01T00:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(user.role, Role::User);
        assert!(user.is_active);
        assert!(user.last_login.is_none());
    }
}
