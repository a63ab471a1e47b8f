#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use mentorhub_ai::{AiError, GenerationRequest, TaskReviewer, TextGenerator, UnconfiguredGenerator};
use serde_json::Value;
use tower::ServiceExt;

use mentorhub_api::config::{AiConfig, BookingConfig, ServerConfig};
use mentorhub_api::router::build_app_router;
use mentorhub_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:9002` as CORS origin (matching the dev default)
/// and short booking delays so submission tests stay fast.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:9002".to_string()],
        request_timeout_secs: 30,
        booking: BookingConfig {
            payment_delay: Duration::from_millis(20),
            close_reset_delay: Duration::from_millis(10),
            idle_ttl: Duration::from_secs(60),
        },
        ai: AiConfig::default(),
    }
}

/// Build the full application router with AI review disabled.
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(UnconfiguredGenerator))
}

/// Build the full application router around the given generator.
pub fn build_test_app_with(generator: Arc<dyn TextGenerator>) -> Router {
    let state = AppState::new(test_config(), TaskReviewer::new(generator));
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Fake generator
// ---------------------------------------------------------------------------

/// Returns a canned JSON value and counts calls.
pub struct FakeGenerator {
    calls: AtomicUsize,
    response: Result<Value, u16>,
}

impl FakeGenerator {
    pub fn returning(response: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response: Ok(response),
        })
    }

    /// Fails every call with the given HTTP status.
    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response: Err(status),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<Value, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err(status) => Err(AiError::Api {
                status: *status,
                body: "quota exceeded".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
