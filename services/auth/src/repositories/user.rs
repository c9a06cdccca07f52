//! User repository over the users document

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::Utc;
use common::collection::{Collection, Records, next_id};
use common::principal::Role;
use common::store::{DocumentStore, USERS_DOCUMENT};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AuthError, AuthResult};
use crate::models::{NewUser, User, UserPatch, UserProfile, UserStats};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    users: Collection<User>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Collection::new(store, USERS_DOCUMENT),
        }
    }

    /// Create a new user. The username check and the insert share one
    /// locked cycle; the password is hashed before taking the lock.
    pub async fn create(&self, new_user: &NewUser) -> AuthResult<UserProfile> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_password(&new_user.password)?;
        let now = Utc::now();

        let user = self
            .users
            .modify(|users| {
                if username_taken(users, &new_user.username, None) {
                    return Err(AuthError::DuplicateUsername);
                }
                let id = next_id(users);
                let user = User {
                    id,
                    username: new_user.username.clone(),
                    password_hash,
                    role: new_user.role,
                    is_active: true,
                    created_at: now,
                    updated_at: None,
                    last_login: None,
                };
                users.insert(id, user.clone());
                Ok(user)
            })
            .await?;

        Ok(user.into())
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: u64) -> AuthResult<Option<User>> {
        Ok(self.users.get(id).await?)
    }

    /// Find a user by exact (case-sensitive) username
    pub async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .list()
            .await?
            .into_iter()
            .find(|user| user.username == username))
    }

    /// All users in id order
    pub async fn list(&self) -> AuthResult<Vec<User>> {
        Ok(self.users.list().await?)
    }

    /// Merge `patch` into the stored user. A new password is hashed first;
    /// a new username must not belong to another user.
    pub async fn update(&self, id: u64, patch: UserPatch) -> AuthResult<UserProfile> {
        let password_hash = patch.password.as_deref().map(hash_password).transpose()?;
        let now = Utc::now();

        let updated = self
            .users
            .modify(|users| {
                if let Some(username) = &patch.username {
                    if username_taken(users, username, Some(id)) {
                        return Err(AuthError::DuplicateUsername);
                    }
                }
                let user = users.get_mut(&id).ok_or(AuthError::NotFound)?;
                if let Some(username) = patch.username {
                    user.username = username;
                }
                if let Some(password_hash) = password_hash {
                    user.password_hash = password_hash;
                }
                if let Some(role) = patch.role {
                    user.role = role;
                }
                if let Some(is_active) = patch.is_active {
                    user.is_active = is_active;
                }
                user.updated_at = Some(now);
                Ok(user.clone())
            })
            .await?;

        info!("Updated user {}", id);
        Ok(updated.into())
    }

    /// Flip `is_active` against the stored value
    pub async fn toggle_active(&self, id: u64) -> AuthResult<UserProfile> {
        let now = Utc::now();
        self.users
            .update_with(id, |user| {
                user.is_active = !user.is_active;
                user.updated_at = Some(now);
            })
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::NotFound)
    }

    /// Delete a user
    pub async fn delete(&self, id: u64) -> AuthResult<()> {
        if !self.users.delete(id).await? {
            return Err(AuthError::NotFound);
        }
        info!("Deleted user {}", id);
        Ok(())
    }

    /// Verify a plaintext password against a stored hash. A hash that
    /// cannot be parsed never verifies.
    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(password_hash) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Stored password hash could not be parsed: {}", e);
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Record a successful login. Unknown ids are ignored.
    pub async fn touch_last_login(&self, id: u64) -> AuthResult<()> {
        let now = Utc::now();
        self.users
            .update_with(id, |user| user.last_login = Some(now))
            .await?;
        Ok(())
    }

    /// Whether `username` is taken by any user other than `exclude_id`
    pub async fn username_exists(
        &self,
        username: &str,
        exclude_id: Option<u64>,
    ) -> AuthResult<bool> {
        Ok(username_taken(&self.users.load().await?, username, exclude_id))
    }

    /// Aggregate user counts
    pub async fn stats(&self) -> AuthResult<UserStats> {
        let users = self.users.list().await?;
        let active = users.iter().filter(|user| user.is_active).count();
        let admins = users.iter().filter(|user| user.role == Role::Admin).count();

        Ok(UserStats {
            total: users.len(),
            active,
            inactive: users.len() - active,
            admins,
            regular_users: users.len() - admins,
        })
    }
}

fn username_taken(users: &Records<User>, username: &str, exclude_id: Option<u64>) -> bool {
    users
        .values()
        .any(|user| user.username == username && Some(user.id) != exclude_id)
}

/// Hash a password with Argon2 and a random salt
fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}
