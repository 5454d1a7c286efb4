use axum::{extract::State, response::Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{session, CurrentUser};
use crate::models::User;
use crate::services::users::{self, NewUser};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::AppJson;
use crate::utils::response::{created, empty_success, success};
use crate::utils::validation;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginPayload {
    token: Uuid,
    expires_at: DateTime<Utc>,
    user: User,
    redirect_to: &'static str,
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> AppResult<Response> {
    let name = validation::name(&request.name)?;
    let email = validation::email(&request.email)?;
    validation::new_password(&request.password, &request.confirm_password)?;

    let new_user = NewUser {
        name,
        email,
        password: request.password,
    };

    let user = users::register(&state.pool, new_user).await?;

    Ok(created(user, "Registration successful! You can now log in."))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Response> {
    let email = validation::email(&request.email)?;
    if request.password.is_empty() {
        return Err(AppError::ValidationError(
            "Please fill in all fields".to_string(),
        ));
    }

    let user = users::authenticate(&state.pool, &email, request.password).await?;

    let purged = session::purge_expired_sessions(&state.pool).await?;
    if purged > 0 {
        tracing::debug!(purged, "Expired sessions removed");
    }

    let new_session =
        session::create_session(&state.pool, user.id, state.config.session_ttl_hours).await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User logged in");

    let payload = LoginPayload {
        token: new_session.token,
        expires_at: new_session.expires_at,
        redirect_to: user.role.landing_path(),
        user,
    };

    Ok(success(payload, "Login successful"))
}

pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    session::delete_session(&state.pool, user.session_id).await?;

    tracing::info!(user_id = %user.id, "User logged out");
    Ok(empty_success("Logged out"))
}

pub async fn me(user: CurrentUser) -> AppResult<Response> {
    Ok(success(user, "Current user"))
}
