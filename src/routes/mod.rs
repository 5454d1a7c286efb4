use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    admin, auth, bookings, events, health_check, not_found, organizer, payments,
};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route(
            "/cart",
            get(bookings::view_cart)
                .post(bookings::add_to_cart)
                .delete(bookings::clear_cart),
        )
        .route("/cart/confirm", post(bookings::confirm_all))
        .route("/bookings", get(bookings::my_bookings))
        .route("/bookings/:id/confirm", post(bookings::confirm_booking))
        .route("/bookings/:id/cancel", post(bookings::cancel_booking))
        .route("/checkout", get(payments::checkout))
        .route("/payments", post(payments::process_payment))
        .route(
            "/organizer/events",
            get(organizer::my_events).post(organizer::create_event),
        )
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", delete(admin::delete_user))
        .route("/admin/users/:id/role", patch(admin::change_user_role))
        .route("/admin/events", get(admin::list_events))
        .route("/admin/events/:id", delete(admin::delete_event))
        .route(
            "/admin/events/:id/publish",
            patch(admin::set_event_published),
        )
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
}
