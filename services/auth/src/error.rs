//! Custom error types for the authentication service

use common::error::{StoreError, ValidationErrors};
use common::principal::Role;
use thiserror::Error;

fn role_title(role: &Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Admin => "Admin",
    }
}

/// Custom error type for authentication and user management
#[derive(Error, Debug)]
pub enum AuthError {
    /// No user with the requested id
    #[error("User not found")]
    NotFound,

    /// Username is already taken
    #[error("Username already exists")]
    DuplicateUsername,

    /// Admin registration without the configured register key
    #[error("Invalid register key for admin registration")]
    InvalidRegisterKey,

    /// Unknown username or wrong password; the two are indistinguishable
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Credentials are valid but the account is disabled
    #[error("Account is inactive")]
    AccountInactive,

    /// No bearer token on a request that needs one
    #[error("No token provided")]
    MissingToken,

    /// Token signature is valid but it has expired
    #[error("Token expired")]
    TokenExpired,

    /// Token is malformed or its signature does not verify
    #[error("Invalid token")]
    TokenInvalid,

    /// Token verified but its user is gone or inactive
    #[error("Invalid token or user inactive")]
    Unauthorized,

    /// Caller lacks the required role
    #[error("{} access required", role_title(.0))]
    Forbidden(Role),

    /// Admins cannot delete themselves
    #[error("Cannot delete your own account")]
    SelfDeletion,

    /// Admins cannot toggle their own status
    #[error("Cannot change your own account status")]
    SelfStatusChange,

    /// A new password was supplied without the current one
    #[error("Current password is required to set new password")]
    CurrentPasswordRequired,

    /// The current password did not verify
    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,

    /// Input rejected field by field
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Password hashing failed
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    /// Token could not be signed
    #[error("Failed to issue token: {0}")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),

    /// Underlying document store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
