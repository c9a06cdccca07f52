//! Input validation utilities

use common::error::ValidationErrors;

use crate::models::{LoginCredentials, Registration};

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_USERNAME_LENGTH: usize = 32;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    let username = username.trim();

    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters long"
        ));
    }

    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("Username cannot contain whitespace".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        ));
    }

    Ok(())
}

/// Validate a registration request, collecting every field error
pub fn validate_registration(registration: &Registration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(message) = validate_username(&registration.username) {
        errors.add("username", message);
    }
    if let Err(message) = validate_password(&registration.password) {
        errors.add("password", message);
    }

    errors.into_result()
}

/// Both login fields must be present; their values are checked by login itself
pub fn validate_login(credentials: &LoginCredentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if credentials.username.trim().is_empty() {
        errors.add("username", "Username is required");
    }
    if credentials.password.is_empty() {
        errors.add("password", "Password is required");
    }

    errors.into_result()
}
