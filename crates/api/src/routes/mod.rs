pub mod booking;
pub mod catalog;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /experts                                  list (?expertise=)
/// /experts/{id}                             detail
/// /experts/{id}/availability                durations, prices, slots
/// /experts/{id}/bookings                    open a booking wizard (POST)
///
/// /courses                                  list
/// /tasks                                    list
/// /tasks/{id}                               detail
/// /tasks/{id}/review                        AI review action (POST)
/// /sessions                                 list (?status=upcoming)
///
/// /bookings/{id}                            snapshot, update (PATCH), close (DELETE)
/// /bookings/{id}/continue                   advance one step (POST)
/// /bookings/{id}/back                       previous step (POST)
/// /bookings/{id}/submit                     simulated payment (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .nest("/bookings", booking::router())
}
