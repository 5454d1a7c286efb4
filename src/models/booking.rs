//! Booking rows and the cart → booked → paid state machine.
//!
//! ```text
//! cart ──confirm──▶ booked ──pay──▶ paid
//!   │                  │
//!   └─cancel─▶ ∅       └─cancel─▶ ∅ (tickets returned to the event)
//! ```
//!
//! Cancelled bookings are deleted rather than kept in a terminal state, so a
//! cancellation can only ever return inventory once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Cart,
    Booked,
    Paid,
}

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Cart, BookingStatus::Booked)
                | (BookingStatus::Booked, BookingStatus::Paid)
        )
    }

    /// Open bookings block a second booking for the same event.
    pub fn is_open(self) -> bool {
        matches!(self, BookingStatus::Cart | BookingStatus::Booked)
    }

    pub fn is_cancellable(self) -> bool {
        self.is_open()
    }

    /// Only `booked` rows hold inventory; cart items never decremented it.
    pub fn tickets_to_restore(self, tickets_requested: i32) -> i32 {
        match self {
            BookingStatus::Booked => tickets_requested,
            BookingStatus::Cart | BookingStatus::Paid => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub tickets_requested: i32,
    pub status: BookingStatus,
    pub booking_reference: Option<String>,
    pub total_amount: Option<Decimal>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booking joined with the event fields needed to display and re-check it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookingWithEvent {
    pub id: Uuid,
    pub event_id: Uuid,
    pub tickets_requested: i32,
    pub status: BookingStatus,
    pub booking_reference: Option<String>,
    pub total_amount: Option<Decimal>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub venue: String,
    pub event_date: DateTime<Utc>,
    pub price: Decimal,
    pub available_tickets: i32,
}

impl BookingWithEvent {
    /// Amount owed: the stored total once confirmed, otherwise the live price.
    pub fn amount_due(&self) -> Decimal {
        self.total_amount
            .unwrap_or_else(|| line_total(self.tickets_requested, self.price))
    }
}

pub fn line_total(tickets: i32, price: Decimal) -> Decimal {
    Decimal::from(tickets) * price
}

pub fn ensure_available(available: i32, requested: i32) -> AppResult<()> {
    if available < requested {
        return Err(AppError::Conflict(format!(
            "Only {available} tickets available"
        )));
    }
    Ok(())
}

pub fn ensure_not_started(
    title: &str,
    event_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if event_date <= now {
        return Err(AppError::Conflict(format!(
            "'{title}' has already started"
        )));
    }
    Ok(())
}

/// `BK` followed by 13 uppercase hex digits.
pub fn generate_booking_reference() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("BK{}", &id[..13])
}
