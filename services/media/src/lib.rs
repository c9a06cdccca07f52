//! Photo records, uploaded files and the rules that govern them

pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod uploads;

pub use error::{PhotoError, PhotoResult};
pub use service::PhotoService;
pub use uploads::{UploadConfig, UploadStore};
