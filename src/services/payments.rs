use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payment::{PAYMENT_CURRENCY, PAYMENT_STATUS_COMPLETED};
use crate::models::{Booking, BookingStatus, BookingWithEvent, Payment, PaymentMethod};
use crate::services::bookings::BOOKING_WITH_EVENT_SELECT;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct CheckoutSummary {
    pub items: Vec<BookingWithEvent>,
    pub total_amount: Decimal,
    pub currency: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub booking_references: Vec<String>,
    pub bookings: Vec<Booking>,
}

/// Removes duplicates while keeping the caller's order.
fn unique_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

pub fn payment_total(bookings: &[Booking]) -> Decimal {
    bookings
        .iter()
        .filter_map(|booking| booking.total_amount)
        .sum()
}

pub async fn checkout(
    pool: &PgPool,
    user_id: Uuid,
    booking_ids: Option<Vec<Uuid>>,
) -> AppResult<CheckoutSummary> {
    let requested = booking_ids.as_deref().map(unique_ids);

    let items = sqlx::query_as::<_, BookingWithEvent>(&format!(
        "{BOOKING_WITH_EVENT_SELECT}
         WHERE ub.user_id = $1 AND ub.status = 'booked'
           AND ($2::UUID[] IS NULL OR ub.id = ANY($2))
         ORDER BY ub.created_at"
    ))
    .bind(user_id)
    .bind(requested.as_deref())
    .fetch_all(pool)
    .await?;

    if let Some(requested) = &requested {
        if items.len() != requested.len() {
            return Err(AppError::NotFound(
                "Booking not found or not ready for payment".to_string(),
            ));
        }
    }

    if items.is_empty() {
        return Err(AppError::ValidationError(
            "No bookings are ready for payment".to_string(),
        ));
    }

    Ok(CheckoutSummary {
        total_amount: items.iter().map(BookingWithEvent::amount_due).sum(),
        currency: PAYMENT_CURRENCY,
        items,
    })
}

/// Simulated payment: flips the given `booked` rows to `paid` and records the
/// charge. No money moves.
pub async fn process_payment(
    pool: &PgPool,
    user_id: Uuid,
    booking_ids: &[Uuid],
    method: PaymentMethod,
) -> AppResult<PaymentReceipt> {
    let ids = unique_ids(booking_ids);
    if ids.is_empty() {
        return Err(AppError::ValidationError(
            "No bookings to process".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT * FROM user_bookings WHERE id = ANY($1) AND user_id = $2 FOR UPDATE",
    )
    .bind(&ids)
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    let all_payable = bookings.len() == ids.len()
        && bookings
            .iter()
            .all(|b| b.status.can_transition_to(BookingStatus::Paid));
    if !all_payable {
        return Err(AppError::Conflict(
            "Some bookings were not found or are not ready for payment".to_string(),
        ));
    }

    let amount = payment_total(&bookings);

    let paid = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE user_bookings
        SET status = 'paid', paid_at = NOW(), updated_at = NOW()
        WHERE id = ANY($1) AND status = 'booked'
        RETURNING *
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;

    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (id, user_id, method, amount, currency, status) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(method.as_str())
    .bind(amount)
    .bind(PAYMENT_CURRENCY)
    .bind(PAYMENT_STATUS_COMPLETED)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO payment_bookings (payment_id, booking_id) SELECT $1, UNNEST($2::UUID[])",
    )
    .bind(payment.id)
    .bind(&ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let booking_references: Vec<String> = paid
        .iter()
        .filter_map(|b| b.booking_reference.clone())
        .collect();

    tracing::info!(
        %user_id,
        payment_id = %payment.id,
        method = method.as_str(),
        %amount,
        bookings = paid.len(),
        "Payment processed"
    );

    Ok(PaymentReceipt {
        payment,
        booking_references,
        bookings: paid,
    })
}
