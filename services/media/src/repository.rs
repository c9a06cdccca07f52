use chrono::Utc;
use common::collection::Collection;
use common::pagination::{Page, PageRequest, paginate};
use common::store::{DocumentStore, PHOTOS_DOCUMENT};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::error::{PhotoError, PhotoResult};
use crate::models::{NewPhoto, Photo, PhotoFilters, PhotoPatch, PhotoStats, TagCount};

const POPULAR_TAGS: usize = 10;
const RECENT_PHOTOS: usize = 5;

/// Outcome of [`PhotoRepository::delete`]
#[derive(Debug)]
pub struct DeletedPhoto {
    pub photo: Photo,
    pub url_shared: bool,
}

#[derive(Clone)]
pub struct PhotoRepository {
    photos: Collection<Photo>,
}

impl PhotoRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            photos: Collection::new(store, PHOTOS_DOCUMENT),
        }
    }

    pub async fn create(&self, new_photo: NewPhoto) -> PhotoResult<Photo> {
        let now = Utc::now();
        let photo = self
            .photos
            .insert_with(|id| Photo {
                id,
                url: new_photo.url,
                title: new_photo.title,
                description: new_photo.description,
                tags: new_photo.tags,
                user_id: new_photo.user_id,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!("Created photo {} ({})", photo.id, photo.url);
        Ok(photo)
    }

    pub async fn find_by_id(&self, id: u64) -> PhotoResult<Option<Photo>> {
        Ok(self.photos.get(id).await?)
    }

    pub async fn update(&self, id: u64, patch: PhotoPatch) -> PhotoResult<Photo> {
        let now = Utc::now();
        self.photos
            .update_with(id, |photo| {
                if let Some(url) = patch.url {
                    photo.url = url;
                }
                if let Some(title) = patch.title {
                    photo.title = title;
                }
                if let Some(description) = patch.description {
                    photo.description = description;
                }
                if let Some(tags) = patch.tags {
                    photo.tags = tags;
                }
                photo.updated_at = now;
            })
            .await?
            .ok_or(PhotoError::NotFound)
    }

    /// Remove a photo. The result says whether any remaining photo still
    /// points at the same url.
    pub async fn delete(&self, id: u64) -> PhotoResult<DeletedPhoto> {
        let deleted = self
            .photos
            .modify(|photos| {
                let photo = photos.remove(&id).ok_or(PhotoError::NotFound)?;
                let url_shared = photos.values().any(|other| other.url == photo.url);
                Ok::<_, PhotoError>(DeletedPhoto { photo, url_shared })
            })
            .await?;

        info!("Deleted photo {}", id);
        Ok(deleted)
    }

    /// Filter, sort newest first and slice out one page
    pub async fn paginate(
        &self,
        request: PageRequest,
        filters: &PhotoFilters,
    ) -> PhotoResult<Page<Photo>> {
        let mut photos: Vec<Photo> = self
            .photos
            .list()
            .await?
            .into_iter()
            .filter(|photo| filters.matches(photo))
            .collect();
        sort_newest_first(&mut photos);

        Ok(paginate(photos, request))
    }

    /// Uniformly random photo, `None` when there are none
    pub async fn random(&self) -> PhotoResult<Option<Photo>> {
        let photos = self.photos.list().await?;
        Ok(photos.choose(&mut rand::thread_rng()).cloned())
    }

    pub async fn stats(&self) -> PhotoResult<PhotoStats> {
        let mut photos = self.photos.list().await?;

        // Counts in first-seen order so the stable sort breaks ties by it
        let mut counts: Vec<TagCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for tag in photos.iter().flat_map(|photo| photo.tags.iter()) {
            match index.get(tag.as_str()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(tag.as_str(), counts.len());
                    counts.push(TagCount {
                        tag: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
        let total_tags = counts.len();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(POPULAR_TAGS);

        let total = photos.len();
        sort_newest_first(&mut photos);
        photos.truncate(RECENT_PHOTOS);

        Ok(PhotoStats {
            total,
            total_tags,
            popular_tags: counts,
            recent_photos: photos,
        })
    }
}

fn sort_newest_first(photos: &mut [Photo]) {
    photos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
