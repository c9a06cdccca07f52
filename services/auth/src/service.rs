//! Registration, login, token authentication and user management

use anyhow::Result;
use common::error::ValidationErrors;
use common::pagination::{Page, PageRequest, paginate};
use common::store::DocumentStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthResult};
use crate::jwt::{JwtConfig, JwtService};
use crate::models::{
    LoginCredentials, NewUser, Principal, ProfileUpdate, Registration, Role, Session, UserPatch,
    UserProfile, UserStats,
};
use crate::repositories::UserRepository;
use crate::validation::{
    validate_login, validate_password, validate_registration, validate_username,
};

const DEFAULT_REGISTER_KEY: &str = "default_register_key";

/// Authentication service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    /// Shared secret required to register an admin account
    pub register_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            register_key: DEFAULT_REGISTER_KEY.to_string(),
        }
    }
}

impl AuthConfig {
    /// Create a new AuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`, `JWT_EXPIRES_IN`: see [`JwtConfig::from_env`]
    /// - `REGISTER_KEY`: admin registration secret (default: `default_register_key`)
    pub fn from_env() -> Result<Self> {
        let jwt = JwtConfig::from_env()?;
        let register_key = std::env::var("REGISTER_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTER_KEY.to_string());

        Ok(Self { jwt, register_key })
    }
}

/// Authentication and user management service
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: JwtService,
    register_key: Arc<str>,
}

impl AuthService {
    pub fn new(store: Arc<dyn DocumentStore>, config: AuthConfig) -> Self {
        Self {
            users: UserRepository::new(store),
            jwt: JwtService::new(config.jwt),
            register_key: config.register_key.into(),
        }
    }

    /// Register a new account. Admin accounts need the register key.
    pub async fn register(&self, registration: Registration) -> AuthResult<UserProfile> {
        validate_registration(&registration).map_err(AuthError::Validation)?;

        let username = registration.username.trim().to_string();
        let role = registration.role.unwrap_or_default();

        if role == Role::Admin
            && registration.register_key.as_deref() != Some(self.register_key.as_ref())
        {
            warn!("Rejected admin registration for {} with a bad register key", username);
            return Err(AuthError::InvalidRegisterKey);
        }

        // Checked again under the collection lock on insert
        if self.users.username_exists(&username, None).await? {
            return Err(AuthError::DuplicateUsername);
        }

        let profile = self
            .users
            .create(&NewUser {
                username,
                password: registration.password,
                role,
            })
            .await?;

        info!("Registered user {} as {}", profile.username, profile.role);
        Ok(profile)
    }

    /// Verify credentials and issue a session token
    pub async fn login(&self, credentials: LoginCredentials) -> AuthResult<Session> {
        validate_login(&credentials).map_err(AuthError::Validation)?;
        let username = credentials.username.trim();

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .users
            .verify_password(&credentials.password, &user.password_hash)
        {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        self.users.touch_last_login(user.id).await?;
        let token = self.jwt.generate_token(user.id)?;

        // Re-read so the returned profile carries the new lastLogin
        let user = self.users.find_by_id(user.id).await?.unwrap_or(user);

        info!("User {} logged in", user.username);
        Ok(Session {
            user: user.into(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expires_in(),
        })
    }

    /// Resolve a bearer token to the caller it was issued for
    pub async fn authenticate(&self, token: &str) -> AuthResult<Principal> {
        let claims = self.jwt.validate_token(token)?;
        let user_id = claims.user_id()?;

        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user.principal()),
            _ => Err(AuthError::Unauthorized),
        }
    }

    /// Like [`authenticate`](Self::authenticate), but every failure yields an
    /// anonymous caller
    pub async fn optional_authenticate(&self, token: Option<&str>) -> Option<Principal> {
        let token = token?;
        match self.authenticate(token).await {
            Ok(principal) => Some(principal),
            Err(e) => {
                debug!("Continuing anonymously: {}", e);
                None
            }
        }
    }

    /// Fail with `Forbidden` unless the caller holds `role`
    pub fn require_role(&self, principal: &Principal, role: Role) -> AuthResult<()> {
        if principal.role != role {
            return Err(AuthError::Forbidden(role));
        }
        Ok(())
    }

    pub async fn profile(&self, user_id: u64) -> AuthResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::NotFound)
    }

    /// Change the caller's own username and/or password
    pub async fn update_profile(
        &self,
        user_id: u64,
        update: ProfileUpdate,
    ) -> AuthResult<UserProfile> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        let mut patch = UserPatch::default();
        let mut errors = ValidationErrors::new();

        if let Some(username) = update.username {
            match validate_username(&username) {
                Ok(()) => {
                    let username = username.trim().to_string();
                    if username != user.username {
                        if self.users.username_exists(&username, Some(user_id)).await? {
                            return Err(AuthError::DuplicateUsername);
                        }
                        patch.username = Some(username);
                    }
                }
                Err(message) => errors.add("username", message),
            }
        }

        if let Some(new_password) = update.new_password {
            if let Err(message) = validate_password(&new_password) {
                errors.add("newPassword", message);
            }
            errors.into_result().map_err(AuthError::Validation)?;

            let current = update
                .current_password
                .filter(|password| !password.is_empty())
                .ok_or(AuthError::CurrentPasswordRequired)?;
            if !self.users.verify_password(&current, &user.password_hash) {
                return Err(AuthError::CurrentPasswordIncorrect);
            }
            patch.password = Some(new_password);
        } else {
            errors.into_result().map_err(AuthError::Validation)?;
        }

        self.users.update(user_id, patch).await
    }

    /// All users, newest first
    pub async fn list_users(&self, request: PageRequest) -> AuthResult<Page<UserProfile>> {
        let mut users = self.users.list().await?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(paginate(users, request).map(UserProfile::from))
    }

    pub async fn delete_user(&self, target_id: u64, acting: &Principal) -> AuthResult<()> {
        if target_id == acting.id {
            return Err(AuthError::SelfDeletion);
        }
        self.users.delete(target_id).await?;
        info!("User {} deleted by {}", target_id, acting.username);
        Ok(())
    }

    /// Flip a user's active flag
    pub async fn toggle_user_status(
        &self,
        target_id: u64,
        acting: &Principal,
    ) -> AuthResult<UserProfile> {
        if target_id == acting.id {
            return Err(AuthError::SelfStatusChange);
        }

        let profile = self.users.toggle_active(target_id).await?;

        info!(
            "User {} {} by {}",
            profile.username,
            if profile.is_active { "activated" } else { "deactivated" },
            acting.username
        );
        Ok(profile)
    }

    pub async fn user_stats(&self) -> AuthResult<UserStats> {
        self.users.stats().await
    }
}
