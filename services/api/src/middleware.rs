//! Bearer token authentication middleware

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use auth::AuthError;
use common::principal::{Principal, Role};

use crate::{error::ApiError, state::AppState};

type BearerHeader = TypedHeader<Authorization<Bearer>>;

/// The authenticated caller. Only available behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Auth(AuthError::MissingToken))
    }
}

/// The caller if one was identified, `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Principal>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Principal>().cloned()))
    }
}

/// Reject requests without a valid bearer token for an active user
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<BearerHeader>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(authorization) = bearer.ok_or(AuthError::MissingToken)?;
    let principal = state.auth.authenticate(authorization.token()).await?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Identify the caller when possible, never reject
pub async fn optional_auth(
    State(state): State<AppState>,
    bearer: Option<BearerHeader>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = bearer
        .as_ref()
        .map(|TypedHeader(authorization)| authorization.token());

    if let Some(principal) = state.auth.optional_authenticate(token).await {
        req.extensions_mut().insert(principal);
    }
    next.run(req).await
}

/// Admin role check; must run after [`require_auth`]
pub async fn require_admin(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.auth.require_role(&user, Role::Admin)?;
    Ok(next.run(req).await)
}
