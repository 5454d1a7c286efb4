//! Cart and booking transitions.
//!
//! Inventory only moves on `cart → booked` (decrement) and on cancelling a
//! `booked` row (increment). Both happen in the same transaction as the
//! booking row change, with the event rows locked.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::booking::{
    ensure_available, ensure_not_started, generate_booking_reference, line_total,
};
use crate::models::{Booking, BookingStatus, BookingWithEvent, Event};
use crate::services::is_unique_violation;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation;

pub(crate) const BOOKING_WITH_EVENT_SELECT: &str = r#"
    SELECT ub.id, ub.event_id, ub.tickets_requested, ub.status, ub.booking_reference,
           ub.total_amount, ub.paid_at, ub.created_at,
           e.title, e.venue, e.event_date, e.price, e.available_tickets
    FROM user_bookings ub
    JOIN events e ON e.id = ub.event_id
"#;

#[derive(Debug, Serialize)]
pub struct CartUpdate {
    pub booking: Booking,
    /// `true` when an existing cart row had its quantity replaced.
    pub updated_existing: bool,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub booked_items: Vec<BookingWithEvent>,
    pub cart_items: Vec<BookingWithEvent>,
    pub booked_total: Decimal,
    pub cart_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ConfirmedBookings {
    pub bookings: Vec<Booking>,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CancelledBooking {
    pub booking_id: Uuid,
    pub event_id: Uuid,
    pub previous_status: BookingStatus,
    pub tickets_restored: i32,
}

#[derive(Debug, Serialize)]
pub struct ClearedCart {
    pub items_removed: usize,
    pub tickets_removed: i64,
}

#[derive(Debug, Serialize)]
pub struct MyBookings {
    pub upcoming: Vec<BookingWithEvent>,
    pub past: Vec<BookingWithEvent>,
}

/// One `cart → booked` promotion, decided before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub booking_id: Uuid,
    pub event_id: Uuid,
    pub tickets: i32,
    pub total_amount: Decimal,
}

/// Checks every cart item against its (locked) event and returns the writes to
/// perform. Fails on the first item that cannot be confirmed, so a batch is
/// either confirmed completely or not at all.
pub fn plan_confirmations(
    items: &[Booking],
    events: &HashMap<Uuid, Event>,
    now: DateTime<Utc>,
) -> AppResult<Vec<Confirmation>> {
    let mut remaining: HashMap<Uuid, i32> = events
        .iter()
        .map(|(id, event)| (*id, event.available_tickets))
        .collect();

    items
        .iter()
        .map(|item| {
            if !item.status.can_transition_to(BookingStatus::Booked) {
                return Err(AppError::Conflict(
                    "Booking not found or already confirmed".to_string(),
                ));
            }

            let event = events
                .get(&item.event_id)
                .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

            if !event.is_published {
                return Err(AppError::Conflict(format!(
                    "'{}' is no longer on sale",
                    event.title
                )));
            }
            ensure_not_started(&event.title, event.event_date, now)?;

            let left = remaining.entry(item.event_id).or_insert(0);
            ensure_available(*left, item.tickets_requested)?;
            *left -= item.tickets_requested;

            Ok(Confirmation {
                booking_id: item.id,
                event_id: item.event_id,
                tickets: item.tickets_requested,
                total_amount: line_total(item.tickets_requested, event.price),
            })
        })
        .collect()
}

pub fn split_by_event_date(
    bookings: Vec<BookingWithEvent>,
    now: DateTime<Utc>,
) -> MyBookings {
    let (upcoming, past): (Vec<_>, Vec<_>) = bookings
        .into_iter()
        .partition(|booking| booking.event_date > now);
    MyBookings { upcoming, past }
}

async fn lock_events(
    tx: &mut Transaction<'_, Postgres>,
    event_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Event>> {
    // Fixed lock order keeps concurrent batch confirmations from deadlocking.
    let events = sqlx::query_as::<_, Event>(
        "SELECT * FROM events WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(event_ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(events.into_iter().map(|event| (event.id, event)).collect())
}

async fn apply_confirmation(
    tx: &mut Transaction<'_, Postgres>,
    confirmation: &Confirmation,
) -> AppResult<Booking> {
    sqlx::query(
        "UPDATE events SET available_tickets = available_tickets - $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(confirmation.tickets)
    .bind(confirmation.event_id)
    .execute(&mut **tx)
    .await?;

    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE user_bookings
        SET status = 'booked', booking_reference = $1, total_amount = $2, updated_at = NOW()
        WHERE id = $3 AND status = 'cart'
        RETURNING *
        "#,
    )
    .bind(generate_booking_reference())
    .bind(confirmation.total_amount)
    .bind(confirmation.booking_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

pub async fn add_to_cart(
    pool: &PgPool,
    user_id: Uuid,
    event_id: Uuid,
    tickets: i32,
    max_tickets: i32,
) -> AppResult<CartUpdate> {
    validation::ticket_count(tickets, max_tickets)?;

    let mut tx = pool.begin().await?;

    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(|event| event.is_published)
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if event.has_started(Utc::now()) {
        return Err(AppError::Conflict(
            "This event has already started".to_string(),
        ));
    }
    ensure_available(event.available_tickets, tickets)?;

    let existing = sqlx::query_as::<_, Booking>(
        "SELECT * FROM user_bookings \
         WHERE user_id = $1 AND event_id = $2 AND status IN ('cart', 'booked') \
         FOR UPDATE",
    )
    .bind(user_id)
    .bind(event_id)
    .fetch_optional(&mut *tx)
    .await?;

    let update = match existing {
        Some(booking) if booking.status == BookingStatus::Booked => {
            return Err(AppError::Conflict(
                "You have already booked tickets for this event. Complete payment to book again."
                    .to_string(),
            ));
        }
        Some(booking) => {
            let booking = sqlx::query_as::<_, Booking>(
                "UPDATE user_bookings SET tickets_requested = $1, updated_at = NOW() \
                 WHERE id = $2 RETURNING *",
            )
            .bind(tickets)
            .bind(booking.id)
            .fetch_one(&mut *tx)
            .await?;
            CartUpdate {
                booking,
                updated_existing: true,
            }
        }
        None => {
            let booking = sqlx::query_as::<_, Booking>(
                "INSERT INTO user_bookings (id, user_id, event_id, tickets_requested, status) \
                 VALUES ($1, $2, $3, $4, 'cart') RETURNING *",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(event_id)
            .bind(tickets)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("This event is already in your cart".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
            CartUpdate {
                booking,
                updated_existing: false,
            }
        }
    };

    tx.commit().await?;

    tracing::info!(
        %user_id,
        %event_id,
        booking_id = %update.booking.id,
        tickets,
        updated = update.updated_existing,
        "Tickets added to cart"
    );

    Ok(update)
}

pub async fn confirm_booking(pool: &PgPool, user_id: Uuid, booking_id: Uuid) -> AppResult<Booking> {
    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>(
        "SELECT * FROM user_bookings WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(booking_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let events = lock_events(&mut tx, &[booking.event_id]).await?;
    let plan = plan_confirmations(std::slice::from_ref(&booking), &events, Utc::now())?;

    let mut confirmed = None;
    for confirmation in &plan {
        confirmed = Some(apply_confirmation(&mut tx, confirmation).await?);
    }
    let confirmed = confirmed
        .ok_or_else(|| AppError::InternalServerError("empty confirmation plan".to_string()))?;

    tx.commit().await?;

    tracing::info!(
        %user_id,
        booking_id = %confirmed.id,
        event_id = %confirmed.event_id,
        tickets = confirmed.tickets_requested,
        reference = ?confirmed.booking_reference,
        "Booking confirmed"
    );

    Ok(confirmed)
}

pub async fn confirm_all(pool: &PgPool, user_id: Uuid) -> AppResult<ConfirmedBookings> {
    let mut tx = pool.begin().await?;

    let items = sqlx::query_as::<_, Booking>(
        "SELECT * FROM user_bookings WHERE user_id = $1 AND status = 'cart' \
         ORDER BY created_at FOR UPDATE",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    if items.is_empty() {
        return Err(AppError::ValidationError(
            "No cart items to confirm".to_string(),
        ));
    }

    let mut event_ids: Vec<Uuid> = items.iter().map(|item| item.event_id).collect();
    event_ids.sort();
    event_ids.dedup();

    let events = lock_events(&mut tx, &event_ids).await?;
    let plan = plan_confirmations(&items, &events, Utc::now())?;

    let mut bookings = Vec::with_capacity(plan.len());
    for confirmation in &plan {
        bookings.push(apply_confirmation(&mut tx, confirmation).await?);
    }

    tx.commit().await?;

    let total_amount: Decimal = plan.iter().map(|c| c.total_amount).sum();
    tracing::info!(%user_id, count = bookings.len(), %total_amount, "Cart confirmed");

    Ok(ConfirmedBookings {
        bookings,
        total_amount,
    })
}

pub async fn cancel_booking(
    pool: &PgPool,
    user_id: Uuid,
    booking_id: Uuid,
) -> AppResult<CancelledBooking> {
    let mut tx = pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>(
        "SELECT * FROM user_bookings WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(booking_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if !booking.status.is_cancellable() {
        return Err(AppError::Conflict(
            "Paid bookings cannot be cancelled".to_string(),
        ));
    }

    let tickets_restored = booking.status.tickets_to_restore(booking.tickets_requested);
    if tickets_restored > 0 {
        sqlx::query(
            "UPDATE events SET available_tickets = available_tickets + $1, updated_at = NOW() \
             WHERE id = $2",
        )
        .bind(tickets_restored)
        .bind(booking.event_id)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM user_bookings WHERE id = $1")
        .bind(booking.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        %user_id,
        %booking_id,
        event_id = %booking.event_id,
        status = ?booking.status,
        tickets_restored,
        "Booking cancelled"
    );

    Ok(CancelledBooking {
        booking_id,
        event_id: booking.event_id,
        previous_status: booking.status,
        tickets_restored,
    })
}

pub async fn clear_cart(pool: &PgPool, user_id: Uuid) -> AppResult<ClearedCart> {
    let removed: Vec<i32> = sqlx::query_scalar(
        "DELETE FROM user_bookings WHERE user_id = $1 AND status = 'cart' \
         RETURNING tickets_requested",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    if removed.is_empty() {
        return Err(AppError::ValidationError(
            "Your cart is already empty".to_string(),
        ));
    }

    let cleared = ClearedCart {
        items_removed: removed.len(),
        tickets_removed: removed.iter().map(|&t| i64::from(t)).sum(),
    };

    tracing::info!(
        %user_id,
        items = cleared.items_removed,
        tickets = cleared.tickets_removed,
        "Cart cleared"
    );

    Ok(cleared)
}

pub async fn view_cart(pool: &PgPool, user_id: Uuid) -> AppResult<CartView> {
    let rows = sqlx::query_as::<_, BookingWithEvent>(&format!(
        "{BOOKING_WITH_EVENT_SELECT}
         WHERE ub.user_id = $1 AND ub.status IN ('cart', 'booked')
         ORDER BY ub.created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let (booked_items, cart_items): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| row.status == BookingStatus::Booked);

    Ok(CartView {
        booked_total: booked_items.iter().map(BookingWithEvent::amount_due).sum(),
        cart_total: cart_items.iter().map(BookingWithEvent::amount_due).sum(),
        booked_items,
        cart_items,
    })
}

pub async fn my_bookings(pool: &PgPool, user_id: Uuid) -> AppResult<MyBookings> {
    let rows = sqlx::query_as::<_, BookingWithEvent>(&format!(
        "{BOOKING_WITH_EVENT_SELECT}
         WHERE ub.user_id = $1 AND ub.status = 'paid'
         ORDER BY e.event_date ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(split_by_event_date(rows, Utc::now()))
}
