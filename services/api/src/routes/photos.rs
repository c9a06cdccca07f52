//! `/photos` routes

use axum::{
    Router,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use media::{
    PhotoError,
    models::{
        BatchDeleteResult, FileUpload, Photo, PhotoFilters, PhotoInput, PhotoStats, PhotoUpdate,
        TagsInput,
    },
};
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{CurrentUser, MaybeUser, optional_auth, require_admin, require_auth},
    models::{BatchDeleteRequest, PhotoListQuery, SearchQuery, TagsQuery},
    response::ApiResponse,
    state::AppState,
};

/// Multipart field carrying the image
const UPLOAD_FIELD: &str = "photo";

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/photos", get(list_photos))
        .route("/photos/random", get(random_photo))
        .route("/photos/search", get(search_photos))
        .route("/photos/tags", get(photos_by_tags))
        .route("/photos/stats", get(photo_stats))
        .route("/photos/:id", get(get_photo));

    let identified = Router::new()
        .route("/photos", post(create_photo))
        .route("/photos/upload", post(upload_photo))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let authenticated = Router::new()
        .route("/photos/:id", put(update_photo).delete(delete_photo))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/photos/batch-delete", post(batch_delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(identified).merge(authenticated).merge(admin)
}

pub async fn list_photos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PhotoListQuery>,
) -> ApiResult<ApiResponse<Vec<Photo>>> {
    let request = state.paging.request(query.page, query.limit);
    let filters = PhotoFilters::new(query.tags.map(TagsInput::Csv), query.user_id, query.search);

    let page = state.photos.list(request, filters).await?;
    Ok(ApiResponse::paginated("Photos retrieved successfully", page))
}

pub async fn get_photo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<ApiResponse<Photo>> {
    let photo = state.photos.get(id).await?;
    Ok(ApiResponse::ok("Photo retrieved successfully", photo))
}

pub async fn random_photo(State(state): State<AppState>) -> ApiResult<ApiResponse<Photo>> {
    let photo = state.photos.random().await?;
    Ok(ApiResponse::ok("Random photo retrieved successfully", photo))
}

pub async fn search_photos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<ApiResponse<Vec<Photo>>> {
    let request = state.paging.request(query.page, query.limit);
    let page = state.photos.search(query.q.as_deref(), request).await?;
    Ok(ApiResponse::paginated("Photos search completed successfully", page))
}

pub async fn photos_by_tags(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TagsQuery>,
) -> ApiResult<ApiResponse<Vec<Photo>>> {
    let request = state.paging.request(query.page, query.limit);
    let page = state
        .photos
        .by_tags(query.tags.map(TagsInput::Csv), request)
        .await?;
    Ok(ApiResponse::paginated("Photos by tags retrieved successfully", page))
}

pub async fn photo_stats(State(state): State<AppState>) -> ApiResult<ApiResponse<PhotoStats>> {
    let stats = state.photos.stats().await?;
    Ok(ApiResponse::ok("Photo statistics retrieved successfully", stats))
}

/// Create a photo from a URL. Anonymous callers create unowned photos.
pub async fn create_photo(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    ApiJson(input): ApiJson<PhotoInput>,
) -> ApiResult<ApiResponse<Photo>> {
    let photo = state.photos.create(input, user.map(|u| u.id)).await?;
    Ok(ApiResponse::created("Photo created successfully", photo))
}

/// Multipart upload: the image in `photo`, metadata in `title`,
/// `description` and a comma-separated `tags` field
pub async fn upload_photo(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse<Photo>> {
    let Ok(mut multipart) = multipart else {
        return Err(PhotoError::MissingFile.into());
    };
    let max_bytes = state.photos.uploads().max_file_size();

    let mut file = None;
    let mut metadata = PhotoInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            if name != UPLOAD_FIELD {
                return Err(ApiError::bad_request(format!(
                    "Unexpected field name. Expected: {UPLOAD_FIELD}"
                )));
            }
            file = Some(read_file(field, max_bytes).await?);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;
        match name.as_str() {
            "title" => metadata.title = Some(value),
            "description" => metadata.description = Some(value),
            "tags" => metadata.tags = Some(TagsInput::Csv(value)),
            _ => debug!("Ignoring multipart field {}", name),
        }
    }

    let photo = state
        .photos
        .upload(file, metadata, user.map(|u| u.id))
        .await?;
    Ok(ApiResponse::created("Photo uploaded successfully", photo))
}

async fn read_file(field: Field<'_>, max_bytes: usize) -> ApiResult<FileUpload> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let data = field
        .bytes()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?;

    Ok(FileUpload {
        file_name,
        content_type,
        data: data.to_vec(),
    })
}

fn multipart_error(error: MultipartError, max_bytes: usize) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PhotoError::FileTooLarge { max_bytes }.into()
    } else {
        ApiError::bad_request(format!("File upload error: {}", error.body_text()))
    }
}

pub async fn update_photo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<u64>,
    ApiJson(update): ApiJson<PhotoUpdate>,
) -> ApiResult<ApiResponse<Photo>> {
    let photo = state.photos.update(id, update, &user).await?;
    Ok(ApiResponse::ok("Photo updated successfully", photo))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<ApiResponse<()>> {
    state.photos.delete(id, &user).await?;
    Ok(ApiResponse::message("Photo deleted successfully"))
}

pub async fn batch_delete(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiJson(request): ApiJson<BatchDeleteRequest>,
) -> ApiResult<ApiResponse<BatchDeleteResult>> {
    let result = state.photos.batch_delete(&request.photo_ids, &admin).await?;
    Ok(ApiResponse::ok("Batch delete completed", result))
}
