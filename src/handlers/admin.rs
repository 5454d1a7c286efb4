use axum::{extract::State, response::Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::RequireAdmin;
use crate::models::UserRole;
use crate::services::{events, users};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{AppJson, AppPath};
use crate::utils::response::{empty_success, success};

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Response> {
    let users = users::list_users(&state.pool).await?;
    Ok(success(users, "Users loaded"))
}

pub async fn change_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(request): AppJson<ChangeRoleRequest>,
) -> AppResult<Response> {
    let user = users::change_role(&state.pool, admin.id, user_id, request.role).await?;
    Ok(success(user, "User role updated"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(user_id): AppPath<Uuid>,
) -> AppResult<Response> {
    users::delete_user(&state.pool, admin.id, user_id).await?;
    Ok(empty_success("User deleted"))
}

pub async fn list_events(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Response> {
    let events = events::list_all(&state.pool).await?;
    Ok(success(events, "Events loaded"))
}

pub async fn set_event_published(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(event_id): AppPath<Uuid>,
    AppJson(request): AppJson<PublishRequest>,
) -> AppResult<Response> {
    let event = events::set_published(&state.pool, event_id, request.published).await?;
    let message = if event.is_published {
        "Event published"
    } else {
        "Event unpublished"
    };
    Ok(success(event, message))
}

pub async fn delete_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(event_id): AppPath<Uuid>,
) -> AppResult<Response> {
    events::delete_event(&state.pool, event_id).await?;
    Ok(empty_success("Event deleted"))
}
