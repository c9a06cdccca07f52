//! Local storage for uploaded image files
//!
//! Files are written to a flat uploads directory under a random name and
//! served publicly below [`UPLOADS_PREFIX`].

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{PhotoError, PhotoResult};
use crate::models::FileUpload;

/// Public URL prefix of stored uploads
pub const UPLOADS_PREFIX: &str = "/uploads/";

const ALLOWED_MIME_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Upload storage configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub uploads_dir: PathBuf,
    /// Maximum accepted file size in bytes
    pub max_file_size: usize,
    /// Lowercase extensions without the dot
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("./uploads"),
            max_file_size: 5 * 1024 * 1024,
            allowed_extensions: ["jpg", "jpeg", "png", "gif", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl UploadConfig {
    /// Create a new UploadConfig from environment variables
    ///
    /// # Environment Variables
    /// - `UPLOADS_DIR`: directory for uploaded files (default: `./uploads`)
    /// - `MAX_FILE_SIZE`: maximum upload size in bytes (default: 5242880)
    /// - `ALLOWED_FILE_TYPES`: comma-separated extensions (default: `jpg,jpeg,png,gif,webp`)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let uploads_dir = env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.uploads_dir);

        let max_file_size = env::var("MAX_FILE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_file_size);

        let allowed_extensions = env::var("ALLOWED_FILE_TYPES")
            .ok()
            .map(|types| parse_extensions(&types))
            .filter(|types| !types.is_empty())
            .unwrap_or(defaults.allowed_extensions);

        Self {
            uploads_dir,
            max_file_size,
            allowed_extensions,
        }
    }
}

fn parse_extensions(types: &str) -> Vec<String> {
    types
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// A file written to the uploads directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    /// URL path the file is served under
    pub public_path: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    config: UploadConfig,
}

impl UploadStore {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Create the uploads directory if needed
    pub async fn init(config: UploadConfig) -> PhotoResult<Self> {
        tokio::fs::create_dir_all(&config.uploads_dir).await?;
        info!("Uploads directory ready at {}", config.uploads_dir.display());
        Ok(Self::new(config))
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.config.uploads_dir
    }

    pub fn max_file_size(&self) -> usize {
        self.config.max_file_size
    }

    /// Check size, extension and MIME type. Returns the lowercased extension.
    pub fn validate(&self, file: &FileUpload) -> PhotoResult<String> {
        if file.data.len() > self.config.max_file_size {
            return Err(PhotoError::FileTooLarge {
                max_bytes: self.config.max_file_size,
            });
        }

        let extension = Path::new(&file.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .filter(|ext| self.config.allowed_extensions.contains(ext))
            .ok_or_else(|| {
                PhotoError::InvalidFile(format!(
                    "File type not allowed. Allowed types: {}",
                    self.config.allowed_extensions.join(", ")
                ))
            })?;

        let mime = match file.content_type.as_deref() {
            Some(mime) if mime != "application/octet-stream" => mime.to_lowercase(),
            _ => mime_guess::from_path(&file.file_name)
                .first_raw()
                .unwrap_or_default()
                .to_string(),
        };
        if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(PhotoError::InvalidFile(
                "Invalid file type. Only images are allowed".to_string(),
            ));
        }

        Ok(extension)
    }

    /// Validate and write a file under a fresh random name
    pub async fn store(&self, file: &FileUpload) -> PhotoResult<StoredFile> {
        let extension = self.validate(file)?;
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::write(self.config.uploads_dir.join(&file_name), &file.data).await?;
        info!(
            "Stored upload {} as {} ({} bytes)",
            file.file_name,
            file_name,
            file.data.len()
        );

        Ok(StoredFile {
            public_path: format!("{UPLOADS_PREFIX}{file_name}"),
            file_name,
        })
    }

    /// Whether `url` points into the uploads namespace
    pub fn is_internal(&self, url: &str) -> bool {
        url.starts_with(UPLOADS_PREFIX)
    }

    /// Delete the file behind an internal public path. Only the final path
    /// component is used, so the call cannot escape the uploads directory.
    pub async fn remove(&self, public_path: &str) -> PhotoResult<()> {
        let file_name = Path::new(public_path)
            .file_name()
            .ok_or_else(|| PhotoError::InvalidFile(format!("Not a file path: {public_path}")))?;

        tokio::fs::remove_file(self.config.uploads_dir.join(file_name)).await?;
        debug!("Removed upload {}", public_path);
        Ok(())
    }
}
