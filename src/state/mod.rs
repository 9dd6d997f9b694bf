//! Shared application state and the question lifecycle engine.

pub mod lifecycle;

use std::sync::Arc;

use time::Date;
use tokio::sync::{RwLock, watch};

use crate::{
    clock::CivilClock,
    config::AppConfig,
    dao::{anon_stage::AnonVoteStage, poll_store::PollStore},
    error::ServiceError,
};

/// Cheaply clonable handle to the shared application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the durable store slot, the anonymous staging
/// area, the reference clock, and the loaded configuration.
pub struct AppState {
    poll_store: RwLock<Option<Arc<dyn PollStore>>>,
    anon_stage: AnonVoteStage,
    config: AppConfig,
    clock: CivilClock,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`].
    ///
    /// The application starts in degraded mode until a storage backend is
    /// installed by the supervisor.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let clock = CivilClock::from_offset_hours(config.timezone_offset_hours);
        let anon_stage = AnonVoteStage::new(config.anon_cookie_ttl_days);
        Arc::new(Self {
            poll_store: RwLock::new(None),
            anon_stage,
            config,
            clock,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current durable store, if one is installed.
    pub async fn poll_store(&self) -> Option<Arc<dyn PollStore>> {
        let guard = self.poll_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the durable store or fail with a degraded-mode error.
    pub async fn require_poll_store(&self) -> Result<Arc<dyn PollStore>, ServiceError> {
        self.poll_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_poll_store(&self, store: Arc<dyn PollStore>) {
        {
            let mut guard = self.poll_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_poll_store(&self) {
        {
            let mut guard = self.poll_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Staging area holding anonymous vote records.
    pub fn anon_stage(&self) -> &AnonVoteStage {
        &self.anon_stage
    }

    /// Loaded runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Reference clock resolving civil dates.
    pub fn clock(&self) -> CivilClock {
        self.clock
    }

    /// Today's civil date in the reference timezone.
    pub fn today(&self) -> Date {
        self.clock.today()
    }
}
