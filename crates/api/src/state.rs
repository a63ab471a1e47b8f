use std::sync::Arc;

use mentorhub_ai::TaskReviewer;

use crate::booking_store::BookingStore;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Open booking wizards, keyed by wizard id. Process memory only.
    pub bookings: Arc<BookingStore>,
    /// AI task review flow.
    pub reviewer: Arc<TaskReviewer>,
}

impl AppState {
    pub fn new(config: ServerConfig, reviewer: TaskReviewer) -> Self {
        let bookings = BookingStore::new(config.booking.clone());
        Self {
            config: Arc::new(config),
            bookings: Arc::new(bookings),
            reviewer: Arc::new(reviewer),
        }
    }
}
