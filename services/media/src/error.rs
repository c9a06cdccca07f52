//! Error types for the photo service

use common::error::{StoreError, ValidationErrors};
use thiserror::Error;

fn megabytes(bytes: &usize) -> u64 {
    (*bytes as f64 / (1024.0 * 1024.0)).round() as u64
}

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Photo not found")]
    NotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("No photos available")]
    NoPhotos,

    #[error("Photo URL is required")]
    MissingUrl,

    #[error("No file uploaded")]
    MissingFile,

    /// Rejected by the extension or MIME allow-list
    #[error("{0}")]
    InvalidFile(String),

    #[error("File too large. Max size: {}MB", megabytes(.max_bytes))]
    FileTooLarge { max_bytes: usize },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Upload storage error: {0}")]
    Upload(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type PhotoResult<T> = Result<T, PhotoError>;
