use axum::{extract::State, response::Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::MaybeUser;
use crate::services::events;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{AppPath, AppQuery};
use crate::utils::response::success;

#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    pub search: Option<String>,
}

pub async fn list_events(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EventQuery>,
) -> AppResult<Response> {
    let events = events::list_published(&state.pool, query.search.as_deref()).await?;
    let message = format!("{} upcoming event(s)", events.len());
    Ok(success(events, message))
}

pub async fn get_event(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    AppPath(event_id): AppPath<Uuid>,
) -> AppResult<Response> {
    let detail = events::event_detail(&state.pool, event_id, viewer.as_ref()).await?;
    Ok(success(detail, "Event found"))
}
