//! User accounts, session tokens and access control

pub mod error;
pub mod jwt;
pub mod models;
pub mod repositories;
pub mod service;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use service::{AuthConfig, AuthService};
