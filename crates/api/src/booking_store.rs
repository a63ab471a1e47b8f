//! In-memory registry of open booking wizards.
//!
//! Drafts live only here, keyed by a random wizard id, and disappear when
//! the wizard is closed, when it sits untouched past the idle TTL, or when
//! the process exits. Nothing is written to disk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mentorhub_core::booking::{BookingConfirmation, BookingWizard, WizardError};
use mentorhub_core::catalog::Expert;
use mentorhub_core::error::CoreError;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::error::AppResult;

struct Entry {
    wizard: BookingWizard,
    /// Milliseconds since the store's epoch. Atomic so reads can touch the
    /// entry under the shared lock.
    touched_ms: AtomicU64,
}

type Wizards = Arc<RwLock<HashMap<Uuid, Entry>>>;

pub struct BookingStore {
    wizards: Wizards,
    config: BookingConfig,
    epoch: Instant,
}

impl BookingStore {
    pub fn new(config: BookingConfig) -> Self {
        Self {
            wizards: Arc::new(RwLock::new(HashMap::new())),
            config,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Open a fresh wizard for `expert` and return its id.
    pub async fn open(&self, expert: &'static Expert) -> Uuid {
        let id = Uuid::new_v4();
        let entry = Entry {
            wizard: BookingWizard::new(expert),
            touched_ms: AtomicU64::new(self.now_ms()),
        };
        self.wizards.write().await.insert(id, entry);
        tracing::info!(booking_id = %id, expert_id = expert.id, "Booking wizard opened");
        id
    }

    /// Run `f` against the wizard without mutating it.
    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&BookingWizard) -> T) -> AppResult<T> {
        let wizards = self.wizards.read().await;
        let entry = wizards.get(&id).ok_or_else(|| not_found(id))?;
        entry.touched_ms.store(self.now_ms(), Ordering::Relaxed);
        Ok(f(&entry.wizard))
    }

    /// Run `f` against the wizard under the write lock.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut BookingWizard) -> Result<T, WizardError>,
    ) -> AppResult<T> {
        let mut wizards = self.wizards.write().await;
        let entry = wizards.get_mut(&id).ok_or_else(|| not_found(id))?;
        *entry.touched_ms.get_mut() = self.now_ms();
        Ok(f(&mut entry.wizard)?)
    }

    /// Simulated payment. The lock is not held across the delay, so other
    /// wizards (and reads of this one) proceed while it is processing.
    pub async fn submit(&self, id: Uuid) -> AppResult<BookingConfirmation> {
        self.update(id, BookingWizard::begin_submit).await?;
        tracing::debug!(booking_id = %id, "Processing simulated payment");

        tokio::time::sleep(self.config.payment_delay).await;

        let confirmation = self.update(id, BookingWizard::complete_submit).await?;
        tracing::info!(
            booking_id = %id,
            expert_id = confirmation.expert_id,
            price = confirmation.price,
            "Booking confirmed",
        );
        Ok(confirmation)
    }

    /// Close a wizard. The entry is discarded after the reset delay; the
    /// confirmation, if the wizard reached success, is returned now.
    pub async fn close(&self, id: Uuid) -> AppResult<Option<BookingConfirmation>> {
        let confirmation = self.read(id, |w| w.confirmation().cloned()).await?;

        let wizards = Arc::clone(&self.wizards);
        let delay = self.config.close_reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(entry) = wizards.write().await.remove(&id) {
                let confirmed = entry.wizard.close().is_some();
                tracing::debug!(booking_id = %id, confirmed, "Booking wizard discarded");
            }
        });

        Ok(confirmation)
    }

    /// Drop every wizard untouched for longer than the idle TTL. A wizard
    /// waiting on its payment delay is kept. Returns how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let ttl_ms = self.config.idle_ttl.as_millis() as u64;
        let now = self.now_ms();
        let mut wizards = self.wizards.write().await;
        let before = wizards.len();
        wizards.retain(|id, entry| {
            let idle_ms = now.saturating_sub(*entry.touched_ms.get_mut());
            let keep = idle_ms < ttl_ms || entry.wizard.is_submitting();
            if !keep {
                tracing::debug!(booking_id = %id, idle_ms, "Idle booking wizard evicted");
            }
            keep
        });
        before - wizards.len()
    }

    /// Sweep idle wizards every [`BookingConfig::sweep_interval`] until
    /// `cancel` fires.
    pub async fn run_idle_sweeper(&self, cancel: CancellationToken) {
        let period = self.config.sweep_interval().max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Booking idle sweeper cancelled");
                    break;
                }
                _ = interval.tick() => {
                    let evicted = self.evict_idle().await;
                    if evicted > 0 {
                        tracing::info!(evicted, "Evicted idle booking wizards");
                    }
                }
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.wizards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.wizards.read().await.is_empty()
    }
}

fn not_found(id: Uuid) -> CoreError {
    CoreError::not_found("booking", id.to_string())
}
