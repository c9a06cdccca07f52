//! HTTP surface of the photos API: routing, auth middleware and the JSON
//! envelope

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;

pub use config::Settings;
pub use routes::create_router;
pub use state::AppState;
