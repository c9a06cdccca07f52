//! Application state shared across handlers

use anyhow::Result;
use auth::AuthService;
use common::pagination::PagingConfig;
use common::store::{JsonFileStore, PHOTOS_DOCUMENT, USERS_DOCUMENT};
use media::{PhotoService, UploadStore};
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonFileStore>,
    pub auth: AuthService,
    pub photos: PhotoService,
    pub paging: PagingConfig,
}

impl AppState {
    /// Prepare the data and uploads directories and wire up the services
    pub async fn initialize(settings: &Settings) -> Result<Self> {
        let store = Arc::new(
            JsonFileStore::init(&settings.storage, &[USERS_DOCUMENT, PHOTOS_DOCUMENT]).await?,
        );
        info!("Data directory ready at {}", store.data_dir().display());

        let uploads = UploadStore::init(settings.uploads.clone()).await?;

        Ok(Self {
            auth: AuthService::new(store.clone(), settings.auth.clone()),
            photos: PhotoService::new(store.clone(), uploads, settings.paging),
            paging: settings.paging,
            store,
        })
    }
}
