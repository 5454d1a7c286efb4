//! Axum extractors for session-authenticated routes.
//!
//! Clients send `Authorization: Bearer <session token>`. The token is the id
//! of a row in `sessions`; an expired or unknown token is rejected with
//! `AUTH_ERROR`.
//!
//! ```rust,ignore
//! async fn view_cart(user: CurrentUser) -> AppResult<Response> { ... }
//! async fn create_event(RequireOrganizer(user): RequireOrganizer) -> AppResult<Response> { ... }
//! async fn list_users(RequireAdmin(admin): RequireAdmin) -> AppResult<Response> { ... }
//! ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::session::find_session_user;
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// The signed-in caller, resolved from a live session.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CurrentUser {
    #[serde(skip)]
    pub session_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// Present when the request carries a valid session, `None` otherwise.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

/// Organizer or admin.
#[derive(Debug, Clone)]
pub struct RequireOrganizer(pub CurrentUser);

#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

/// Reads the session token from the `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent.
pub fn bearer_token(parts: &Parts) -> AppResult<Option<Uuid>> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::AuthError("Invalid authorization header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::AuthError(
                "Invalid authorization format. Expected 'Bearer <token>'".to_string(),
            )
        })?;

    Uuid::parse_str(token)
        .map(Some)
        .map_err(|_| AppError::AuthError("Invalid session token".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::AuthError("Please log in to continue".to_string()))?;

        find_session_user(&state.pool, token)
            .await?
            .ok_or_else(|| AppError::AuthError("Session expired, please log in again".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A stale or malformed token degrades to anonymous browsing.
        let Ok(Some(token)) = bearer_token(parts) else {
            return Ok(MaybeUser(None));
        };

        Ok(MaybeUser(find_session_user(&state.pool, token).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireOrganizer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.role.can_manage_events() {
            return Err(AppError::Forbidden(
                "Organizer access required".to_string(),
            ));
        }

        Ok(RequireOrganizer(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user))
    }
}
