use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mentorhub_ai::{GeminiClient, TaskReviewer, TextGenerator, UnconfiguredGenerator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mentorhub_api::config::{AiConfig, ServerConfig};
use mentorhub_api::router::build_app_router;
use mentorhub_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env file if present (ignored in production).
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentorhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let reviewer = TaskReviewer::new(build_generator(&config.ai));

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );

    let state = AppState::new(config, reviewer);
    let bookings = Arc::clone(&state.bookings);
    let app = build_app_router(state);

    // Drop booking drafts abandoned without a close.
    let sweep_cancel = tokio_util::sync::CancellationToken::new();
    let sweep_handle = {
        let bookings = Arc::clone(&bookings);
        let cancel = sweep_cancel.clone();
        tokio::spawn(async move { bookings.run_idle_sweeper(cancel).await })
    };

    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    sweep_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;

    let open = bookings.len().await;
    tracing::info!(open_bookings = open, "Server stopped, discarding open booking drafts");
}

/// Gemini when a key is configured, otherwise a generator that fails every
/// call so reviews report a failure outcome.
fn build_generator(config: &AiConfig) -> Arc<dyn TextGenerator> {
    match &config.api_key {
        Some(key) => {
            tracing::info!(model = %config.model, "AI task review enabled");
            Arc::new(
                GeminiClient::new(key.clone(), config.model.clone()).with_timeout(config.timeout),
            )
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, AI task review is disabled");
            Arc::new(UnconfiguredGenerator)
        }
    }
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
