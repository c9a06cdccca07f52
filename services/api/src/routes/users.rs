//! `/users` routes: registration, login, profile and administration

use auth::models::{
    LoginCredentials, ProfileUpdate, Registration, Session, UserProfile, UserStats,
};
use axum::{
    Router, middleware,
    extract::State,
    routing::{delete, get, patch, post},
};
use media::models::Photo;

use crate::{
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::{CurrentUser, require_admin, require_auth},
    models::PageQuery,
    response::ApiResponse,
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/:id/photos", get(user_photos));

    let authenticated = Router::new()
        .route("/users/profile", get(profile).put(update_profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/stats", get(user_stats))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/toggle-status", patch(toggle_user_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(authenticated).merge(admin)
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(registration): ApiJson<Registration>,
) -> ApiResult<ApiResponse<UserProfile>> {
    let user = state.auth.register(registration).await?;
    Ok(ApiResponse::created("User registered successfully", user))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<LoginCredentials>,
) -> ApiResult<ApiResponse<Session>> {
    let session = state.auth.login(credentials).await?;
    Ok(ApiResponse::ok("Login successful", session))
}

pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<ApiResponse<UserProfile>> {
    let profile = state.auth.profile(user.id).await?;
    Ok(ApiResponse::ok("User profile retrieved successfully", profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<ApiResponse<UserProfile>> {
    let profile = state.auth.update_profile(user.id, update).await?;
    Ok(ApiResponse::ok("User profile updated successfully", profile))
}

pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Vec<UserProfile>>> {
    let request = state.paging.request(query.page, query.limit);
    let page = state.auth.list_users(request).await?;
    Ok(ApiResponse::paginated("Users retrieved successfully", page))
}

pub async fn user_stats(State(state): State<AppState>) -> ApiResult<ApiResponse<UserStats>> {
    let stats = state.auth.user_stats().await?;
    Ok(ApiResponse::ok("User statistics retrieved successfully", stats))
}

pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<ApiResponse<()>> {
    state.auth.delete_user(id, &admin).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}

pub async fn toggle_user_status(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    ApiPath(id): ApiPath<u64>,
) -> ApiResult<ApiResponse<UserProfile>> {
    let user = state.auth.toggle_user_status(id, &admin).await?;
    Ok(ApiResponse::ok("User status updated successfully", user))
}

/// Photos owned by a user; public
pub async fn user_photos(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Vec<Photo>>> {
    let request = state.paging.request(query.page, query.limit);
    let page = state.photos.by_user(id, request).await?;
    Ok(ApiResponse::paginated("User photos retrieved successfully", page))
}

