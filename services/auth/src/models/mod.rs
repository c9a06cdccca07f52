//! Authentication service models

pub mod session;
pub mod user;

// Re-export for convenience
pub use common::principal::{Principal, Role};
pub use session::Session;
pub use user::{
    LoginCredentials, NewUser, ProfileUpdate, Registration, User, UserPatch, UserProfile,
    UserStats,
};
