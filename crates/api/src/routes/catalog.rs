//! Route definitions for the catalog and the actions hanging off it.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{booking, catalog, review};
use crate::state::AppState;

/// Catalog routes, merged at the `/api/v1` root.
///
/// ```text
/// GET    /experts                      -> list_experts  (?expertise=)
/// GET    /experts/{id}                 -> get_expert
/// GET    /experts/{id}/availability    -> get_availability
/// POST   /experts/{id}/bookings        -> open_booking
/// GET    /courses                      -> list_courses
/// GET    /tasks                        -> list_tasks
/// GET    /tasks/{id}                   -> get_task
/// POST   /tasks/{id}/review            -> review_task
/// GET    /sessions                     -> list_sessions (?status=upcoming)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/experts", get(catalog::list_experts))
        .route("/experts/{id}", get(catalog::get_expert))
        .route("/experts/{id}/availability", get(catalog::get_availability))
        .route("/experts/{id}/bookings", post(booking::open_booking))
        .route("/courses", get(catalog::list_courses))
        .route("/tasks", get(catalog::list_tasks))
        .route("/tasks/{id}", get(catalog::get_task))
        .route("/tasks/{id}/review", post(review::review_task))
        .route("/sessions", get(catalog::list_sessions))
}
