//! Route definitions for the `/bookings` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::booking;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
///
/// ```text
/// GET    /{id}             -> get_booking
/// PATCH  /{id}             -> update_booking
/// DELETE /{id}             -> close_booking
/// POST   /{id}/continue    -> continue_booking
/// POST   /{id}/back        -> back_booking
/// POST   /{id}/submit      -> submit_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(booking::get_booking)
                .patch(booking::update_booking)
                .delete(booking::close_booking),
        )
        .route("/{id}/continue", post(booking::continue_booking))
        .route("/{id}/back", post(booking::back_booking))
        .route("/{id}/submit", post(booking::submit_booking))
}
