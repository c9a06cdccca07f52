use common::error::ValidationErrors;
use common::pagination::{Page, PageRequest, PagingConfig};
use common::principal::Principal;
use common::store::DocumentStore;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{PhotoError, PhotoResult};
use crate::models::{
    BatchDeleteFailure, BatchDeleteResult, FileUpload, NewPhoto, Photo, PhotoFilters, PhotoInput,
    PhotoPatch, PhotoStats, PhotoUpdate, TagsInput,
};
use crate::repository::PhotoRepository;
use crate::uploads::UploadStore;

#[derive(Clone)]
pub struct PhotoService {
    photos: PhotoRepository,
    uploads: UploadStore,
    paging: PagingConfig,
}

impl PhotoService {
    pub fn new(store: Arc<dyn DocumentStore>, uploads: UploadStore, paging: PagingConfig) -> Self {
        Self {
            photos: PhotoRepository::new(store),
            uploads,
            paging,
        }
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    fn clamp(&self, request: PageRequest) -> PageRequest {
        request.clamped(self.paging.max_page_size)
    }

    pub async fn list(
        &self,
        request: PageRequest,
        filters: PhotoFilters,
    ) -> PhotoResult<Page<Photo>> {
        self.photos.paginate(self.clamp(request), &filters).await
    }

    pub async fn get(&self, id: u64) -> PhotoResult<Photo> {
        self.photos.find_by_id(id).await?.ok_or(PhotoError::NotFound)
    }

    pub async fn create(&self, input: PhotoInput, owner_id: Option<u64>) -> PhotoResult<Photo> {
        let url = input
            .url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(PhotoError::MissingUrl)?;

        self.photos
            .create(NewPhoto {
                url,
                title: trimmed(input.title).unwrap_or_default(),
                description: trimmed(input.description).unwrap_or_default(),
                tags: input.tags.map(TagsInput::normalize).unwrap_or_default(),
                user_id: owner_id,
            })
            .await
    }

    /// Owner or admin only
    pub async fn update(
        &self,
        id: u64,
        update: PhotoUpdate,
        requester: &Principal,
    ) -> PhotoResult<Photo> {
        let existing = self.get(id).await?;
        if !requester.can_modify(existing.user_id) {
            return Err(PhotoError::PermissionDenied);
        }

        let url = match trimmed(update.url) {
            Some(url) if url.is_empty() => return Err(PhotoError::MissingUrl),
            url => url,
        };

        self.photos
            .update(
                id,
                PhotoPatch {
                    url,
                    title: trimmed(update.title),
                    description: trimmed(update.description),
                    tags: update.tags.map(TagsInput::normalize),
                },
            )
            .await
    }

    /// Owner or admin only. A backing upload is removed best effort, and
    /// only once no other photo references it.
    pub async fn delete(&self, id: u64, requester: &Principal) -> PhotoResult<()> {
        let existing = self.get(id).await?;
        if !requester.can_modify(existing.user_id) {
            return Err(PhotoError::PermissionDenied);
        }

        let deleted = self.photos.delete(id).await?;
        let url = &deleted.photo.url;
        if self.uploads.is_internal(url) {
            if deleted.url_shared {
                info!("Keeping file {} still referenced by another photo", url);
            } else if let Err(e) = self.uploads.remove(url).await {
                warn!("Failed to delete file {}: {}", url, e);
            }
        }
        Ok(())
    }

    /// Store the file, then create a record pointing at it
    pub async fn upload(
        &self,
        file: Option<FileUpload>,
        metadata: PhotoInput,
        owner_id: Option<u64>,
    ) -> PhotoResult<Photo> {
        let file = file.ok_or(PhotoError::MissingFile)?;
        let stored = self.uploads.store(&file).await?;

        let input = PhotoInput {
            url: Some(stored.public_path.clone()),
            ..metadata
        };
        match self.create(input, owner_id).await {
            Ok(photo) => Ok(photo),
            Err(e) => {
                if let Err(cleanup) = self.uploads.remove(&stored.public_path).await {
                    warn!("Failed to remove orphaned upload {}: {}", stored.public_path, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Delete each id independently and report per-id outcomes
    pub async fn batch_delete(
        &self,
        ids: &[u64],
        requester: &Principal,
    ) -> PhotoResult<BatchDeleteResult> {
        if ids.is_empty() {
            return Err(PhotoError::Validation(ValidationErrors::single(
                "photoIds",
                "Photo IDs array is required",
            )));
        }

        let mut result = BatchDeleteResult::default();
        for &id in ids {
            match self.delete(id, requester).await {
                Ok(()) => result.success.push(id),
                Err(e) => result.failed.push(BatchDeleteFailure {
                    id,
                    error: e.to_string(),
                }),
            }
        }

        info!(
            "Batch delete by {}: {} deleted, {} failed",
            requester.username,
            result.success.len(),
            result.failed.len()
        );
        Ok(result)
    }

    pub async fn random(&self) -> PhotoResult<Photo> {
        self.photos.random().await?.ok_or(PhotoError::NoPhotos)
    }

    pub async fn search(
        &self,
        term: Option<&str>,
        request: PageRequest,
    ) -> PhotoResult<Page<Photo>> {
        let term = term
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .ok_or_else(|| {
                PhotoError::Validation(ValidationErrors::single("q", "Search term is required"))
            })?;

        let filters = PhotoFilters {
            search: Some(term.to_string()),
            ..Default::default()
        };
        self.list(request, filters).await
    }

    pub async fn by_tags(
        &self,
        tags: Option<TagsInput>,
        request: PageRequest,
    ) -> PhotoResult<Page<Photo>> {
        let tags = tags.map(TagsInput::normalize).unwrap_or_default();
        if tags.is_empty() {
            return Err(PhotoError::Validation(ValidationErrors::single(
                "tags",
                "Tags are required",
            )));
        }

        let filters = PhotoFilters {
            tags,
            ..Default::default()
        };
        self.list(request, filters).await
    }

    pub async fn by_user(&self, user_id: u64, request: PageRequest) -> PhotoResult<Page<Photo>> {
        let filters = PhotoFilters {
            user_id: Some(user_id),
            ..Default::default()
        };
        self.list(request, filters).await
    }

    pub async fn stats(&self) -> PhotoResult<PhotoStats> {
        self.photos.stats().await
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string())
}
