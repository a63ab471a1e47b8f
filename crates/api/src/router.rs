//! Application router shared by the binary and the integration tests.
//!
//! Mounts the health check at the root and the catalog, booking wizard and
//! task review routes under `/api/v1`, wrapped in one middleware stack.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Headroom kept above the slowest handler before the timeout layer fires.
const HANDLER_HEADROOM: Duration = Duration::from_secs(5);

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full application [`Router`].
///
/// Layers, outermost first: CORS, request id, tracing, request id echo,
/// timeout (408), panic recovery (500).
pub fn build_app_router(state: AppState) -> Router {
    let config = state.config.clone();
    let cors = build_cors_layer(&config);
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout(&config),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Effective per-request timeout.
///
/// A submit holds the request for the payment delay and a review waits on
/// the model for up to the AI timeout. Both must answer with their own
/// outcome, so the configured value is raised above them when too small.
pub fn request_timeout(config: &ServerConfig) -> Duration {
    Duration::from_secs(config.request_timeout_secs)
        .max(config.booking.payment_delay + HANDLER_HEADROOM)
        .max(config.ai.timeout + HANDLER_HEADROOM)
}

/// CORS for the web client. Only the verbs the routes use are allowed:
/// PATCH edits a booking draft and DELETE closes it.
///
/// Panics at startup if a configured origin does not parse.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(3600))
}
