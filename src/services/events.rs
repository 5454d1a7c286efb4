use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::models::{Booking, Event, EventImage, EventSummary};
use crate::utils::error::{AppError, AppResult};

const SUMMARY_SELECT: &str = r#"
    SELECT e.id, e.title, e.venue, e.event_date, e.price, e.total_tickets,
           e.available_tickets, e.total_tickets - e.available_tickets AS tickets_sold,
           e.is_published, e.organizer_id, u.name AS organizer_name
    FROM events e
    LEFT JOIN users u ON u.id = e.organizer_id
"#;

pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub venue: String,
    pub event_date: DateTime<Utc>,
    pub price: Decimal,
    pub total_tickets: i32,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub organizer_name: Option<String>,
    pub images: Vec<EventImage>,
    /// The viewer's open (`cart` or `booked`) booking for this event.
    pub user_booking: Option<Booking>,
}

#[derive(Debug, Serialize)]
pub struct CreatedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub images: Vec<EventImage>,
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub async fn list_published(pool: &PgPool, search: Option<&str>) -> AppResult<Vec<EventSummary>> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);

    let events = sqlx::query_as::<_, EventSummary>(&format!(
        "{SUMMARY_SELECT}
         WHERE e.is_published AND e.event_date > NOW()
           AND ($1::TEXT IS NULL OR e.title ILIKE $1 OR e.venue ILIKE $1)
         ORDER BY e.event_date ASC"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn find_event(pool: &PgPool, event_id: Uuid) -> AppResult<Event> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

pub async fn event_detail(
    pool: &PgPool,
    event_id: Uuid,
    viewer: Option<&CurrentUser>,
) -> AppResult<EventDetail> {
    let event = find_event(pool, event_id).await?;

    let can_see_unpublished = viewer
        .map(|v| v.role.is_admin() || v.id == event.organizer_id)
        .unwrap_or(false);
    if !event.is_published && !can_see_unpublished {
        return Err(AppError::NotFound("Event not found".to_string()));
    }

    let organizer_name: Option<String> =
        sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(event.organizer_id)
            .fetch_optional(pool)
            .await?;

    let images = sqlx::query_as::<_, EventImage>(
        "SELECT * FROM event_images WHERE event_id = $1 ORDER BY display_order ASC",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    let user_booking = match viewer {
        Some(viewer) => {
            sqlx::query_as::<_, Booking>(
                "SELECT * FROM user_bookings \
                 WHERE user_id = $1 AND event_id = $2 AND status IN ('cart', 'booked')",
            )
            .bind(viewer.id)
            .bind(event_id)
            .fetch_optional(pool)
            .await?
        }
        None => None,
    };

    Ok(EventDetail {
        event,
        organizer_name,
        images,
        user_booking,
    })
}

pub async fn create_event(
    pool: &PgPool,
    organizer_id: Uuid,
    new_event: NewEvent,
) -> AppResult<CreatedEvent> {
    let mut tx = pool.begin().await?;

    let event = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (id, organizer_id, title, description, venue, event_date,
                            price, total_tickets, available_tickets)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(organizer_id)
    .bind(&new_event.title)
    .bind(&new_event.description)
    .bind(&new_event.venue)
    .bind(new_event.event_date)
    .bind(new_event.price)
    .bind(new_event.total_tickets)
    .fetch_one(&mut *tx)
    .await?;

    let mut images = Vec::with_capacity(new_event.image_urls.len());
    for (order, url) in new_event.image_urls.iter().enumerate() {
        let image = sqlx::query_as::<_, EventImage>(
            "INSERT INTO event_images (id, event_id, image_url, display_order) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(event.id)
        .bind(url)
        .bind(order as i32)
        .fetch_one(&mut *tx)
        .await?;
        images.push(image);
    }

    tx.commit().await?;

    tracing::info!(
        event_id = %event.id,
        %organizer_id,
        tickets = event.total_tickets,
        images = images.len(),
        "Event created"
    );

    Ok(CreatedEvent { event, images })
}

pub async fn organizer_events(pool: &PgPool, organizer_id: Uuid) -> AppResult<Vec<EventSummary>> {
    let events = sqlx::query_as::<_, EventSummary>(&format!(
        "{SUMMARY_SELECT} WHERE e.organizer_id = $1 ORDER BY e.event_date DESC"
    ))
    .bind(organizer_id)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

pub async fn list_all(pool: &PgPool) -> AppResult<Vec<EventSummary>> {
    let events = sqlx::query_as::<_, EventSummary>(&format!(
        "{SUMMARY_SELECT} ORDER BY e.event_date DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(events)
}

pub async fn set_published(pool: &PgPool, event_id: Uuid, published: bool) -> AppResult<Event> {
    let event = sqlx::query_as::<_, Event>(
        "UPDATE events SET is_published = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(published)
    .bind(event_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    tracing::info!(%event_id, published, "Event visibility changed");
    Ok(event)
}

pub async fn delete_event(pool: &PgPool, event_id: Uuid) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Event not found".to_string()));
    }

    tracing::info!(%event_id, "Event deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("jazz"), "%jazz%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
