//! Database operations behind the HTTP handlers.
//!
//! Every operation that moves a booking between states, or touches an
//! event's `available_tickets`, runs inside a single transaction and locks
//! the rows it re-checks with `SELECT ... FOR UPDATE`.

pub mod bookings;
pub mod events;
pub mod payments;
pub mod users;

const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
