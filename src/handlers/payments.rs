use axum::{extract::State, response::Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::models::PaymentMethod;
use crate::services::payments;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::{AppJson, AppQuery};
use crate::utils::response::success;

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    /// Comma-separated booking ids; all booked items when absent.
    pub booking_ids: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub booking_ids: Vec<Uuid>,
    pub payment_method: PaymentMethod,
}

fn parse_id_list(raw: &str) -> AppResult<Vec<Uuid>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            Uuid::parse_str(id)
                .map_err(|_| AppError::ValidationError(format!("Invalid booking id: {id}")))
        })
        .collect()
}

pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    AppQuery(query): AppQuery<CheckoutQuery>,
) -> AppResult<Response> {
    let booking_ids = query.booking_ids.as_deref().map(parse_id_list).transpose()?;

    let summary = payments::checkout(&state.pool, user.id, booking_ids).await?;
    Ok(success(summary, "Ready for payment"))
}

pub async fn process_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(request): AppJson<PaymentRequest>,
) -> AppResult<Response> {
    let receipt = payments::process_payment(
        &state.pool,
        user.id,
        &request.booking_ids,
        request.payment_method,
    )
    .await?;

    Ok(success(receipt, "Payment successful"))
}
