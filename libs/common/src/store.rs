//! Document store module for handling the JSON files on disk
//!
//! A document is one JSON file in the data directory holding a mapping from
//! stringified numeric id to record. Documents are always read and written
//! whole; there is no partial update on disk.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Name of the document holding user records
pub const USERS_DOCUMENT: &str = "users.json";
/// Name of the document holding photo records
pub const PHOTOS_DOCUMENT: &str = "photos.json";

/// Storage configuration struct
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DATA_DIR`: directory for the JSON documents (default: "./data")
    pub fn from_env() -> Self {
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default().data_dir);

        Self { data_dir }
    }
}

/// Whole-document access to named JSON mappings
///
/// Services only ever talk to this trait (through [`crate::collection::Collection`]),
/// so the file backend can be swapped without touching business logic.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a full document. A document that does not exist reads as empty.
    async fn read(&self, name: &str) -> StoreResult<Map<String, Value>>;

    /// Replace a full document with `document`.
    async fn write(&self, name: &str, document: &Map<String, Value>) -> StoreResult<()>;
}

/// File-backed document store rooted at a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Initialize the store: create the data directory and seed every
    /// document in `documents` that does not exist yet with `{}`.
    pub async fn init(config: &StorageConfig, documents: &[&str]) -> StoreResult<Self> {
        fs::create_dir_all(&config.data_dir)
            .await
            .map_err(|source| StoreError::Io {
                name: config.data_dir.display().to_string(),
                source,
            })?;

        let store = Self::new(config.data_dir.clone());
        for name in documents {
            let path = store.document_path(name)?;
            let exists = fs::try_exists(&path)
                .await
                .map_err(|source| StoreError::Io {
                    name: name.to_string(),
                    source,
                })?;
            if !exists {
                store.write(name, &Map::new()).await?;
                info!("Initialized empty document {}", name);
            }
        }

        info!("Document store ready at {}", config.data_dir.display());
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Check that the data directory is still reachable
    pub async fn health_check(&self) -> StoreResult<bool> {
        let metadata = fs::metadata(&self.data_dir)
            .await
            .map_err(|source| StoreError::Io {
                name: self.data_dir.display().to_string(),
                source,
            })?;

        Ok(metadata.is_dir())
    }

    /// Resolve a document name inside the data directory. Names must be a
    /// single plain path component.
    fn document_path(&self, name: &str) -> StoreResult<PathBuf> {
        let is_plain =
            !name.is_empty() && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
        if !is_plain {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.data_dir.join(name))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn read(&self, name: &str) -> StoreResult<Map<String, Value>> {
        let path = self.document_path(name)?;

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Document {} not found, reading as empty", name);
                return Ok(Map::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    name: name.to_string(),
                    source,
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            name: name.to_string(),
            source,
        })
    }

    async fn write(&self, name: &str, document: &Map<String, Value>) -> StoreResult<()> {
        let path = self.document_path(name)?;
        let json = serde_json::to_string_pretty(document).map_err(|source| StoreError::Corrupt {
            name: name.to_string(),
            source,
        })?;

        // Write next to the target and rename so readers never see half a file.
        let staging = self.data_dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4()));
        let io_error = |source: std::io::Error| StoreError::Io {
            name: name.to_string(),
            source,
        };

        fs::write(&staging, json).await.map_err(io_error)?;
        if let Err(source) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(io_error(source));
        }

        debug!("Wrote document {} ({} records)", name, document.len());
        Ok(())
    }
}
