//! Cart and booking endpoints for the signed-in user.

use axum::{extract::State, response::Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::services::bookings;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::{AppJson, AppPath};
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub event_id: Uuid,
    pub tickets: i32,
}

pub async fn view_cart(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let cart = bookings::view_cart(&state.pool, user.id).await?;
    Ok(success(cart, "Cart loaded"))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<AddToCartRequest>,
) -> AppResult<Response> {
    let update = bookings::add_to_cart(
        &state.pool,
        user.id,
        request.event_id,
        request.tickets,
        state.config.max_tickets_per_booking,
    )
    .await?;

    let message = if update.updated_existing {
        format!("Updated your booking: {} tickets in cart", request.tickets)
    } else {
        format!("Successfully added {} tickets to your cart", request.tickets)
    };
    Ok(success(update, message))
}

pub async fn clear_cart(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let cleared = bookings::clear_cart(&state.pool, user.id).await?;
    let message = format!(
        "Cleared all items from cart ({} events, {} tickets)",
        cleared.items_removed, cleared.tickets_removed
    );
    Ok(success(cleared, message))
}

pub async fn confirm_all(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let confirmed = bookings::confirm_all(&state.pool, user.id).await?;
    let message = format!(
        "Successfully confirmed {} bookings! Please complete payment to secure your tickets.",
        confirmed.bookings.len()
    );
    Ok(success(confirmed, message))
}

pub async fn confirm_booking(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Response> {
    let booking = bookings::confirm_booking(&state.pool, user.id, booking_id).await?;
    let message = format!(
        "Booking confirmed! Reference: {}. Please complete payment.",
        booking.booking_reference.as_deref().unwrap_or("-")
    );
    Ok(success(booking, message))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    user: CurrentUser,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Response> {
    let cancelled = bookings::cancel_booking(&state.pool, user.id, booking_id).await?;
    Ok(success(cancelled, "Booking cancelled successfully"))
}

pub async fn my_bookings(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let bookings = bookings::my_bookings(&state.pool, user.id).await?;
    Ok(success(bookings, "Paid bookings loaded"))
}
