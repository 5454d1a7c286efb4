use axum::response::Response;
use serde::Serialize;

use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod events;
pub mod organizer;
pub mod payments;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "ticketing-api",
    };

    success(payload, "Health check successful")
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
