use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::TransactionSource;
use crate::config::SyncConfig;
use crate::db::TransactionStore;
use crate::models::{PassReport, SharedSyncState, SyncState};
use crate::services::sync_service;
use crate::utils::errors::{RetryClass, SyncError};

/// Periodic driver for sync passes.
///
/// Passes run strictly one after another with `interval` between the end of
/// one and the start of the next. A failed pass is logged and the next one
/// runs on schedule; the scheduler only gives up after
/// `max_consecutive_failures` failures in a row (0 = never).
///
/// Cancellation is checked before each pass and while sleeping. A pass that
/// is already running completes first.
pub struct SyncScheduler<S, T> {
    source: S,
    store: T,
    reference_id: String,
    interval: Duration,
    max_consecutive_failures: u32,
    state: Arc<SharedSyncState>,
    cancel_token: CancellationToken,
}

impl<S, T> SyncScheduler<S, T>
where
    S: TransactionSource,
    T: TransactionStore,
{
    pub fn new(source: S, store: T, config: &SyncConfig) -> Self {
        Self {
            source,
            store,
            reference_id: config.reference_id.clone(),
            interval: config.sync_interval,
            max_consecutive_failures: config.max_consecutive_failures,
            state: Arc::new(SharedSyncState::new()),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token that stops the scheduler when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn shared_state(&self) -> Arc<SharedSyncState> {
        Arc::clone(&self.state)
    }

    /// Run exactly one pass, no sleeping
    pub async fn run_once(&self) -> Result<PassReport, SyncError> {
        let pass = self.state.record_pass();
        let result =
            sync_service::run_pass(&self.source, &self.store, &self.reference_id, &self.state).await;

        match &result {
            Ok(report) => {
                self.state.reset_failures();
                info!(
                    "Pass {} started {} done in {}ms: {} listed, {} inserted, {} already stored",
                    pass,
                    report.started_at.format("%Y-%m-%d %H:%M:%S"),
                    report.elapsed_ms,
                    report.listed,
                    report.inserted,
                    report.skipped
                );
                if report.lost_races > 0 {
                    warn!("Pass {}: {} inserts rejected as duplicates", pass, report.lost_races);
                }
            }
            Err(e) => {
                let failures = self.state.record_failure();
                match e.retry_class() {
                    RetryClass::Retryable => {
                        warn!("Pass {} failed ({} in a row), retrying next interval: {}", pass, failures, e)
                    }
                    RetryClass::Permanent => {
                        error!("Pass {} failed ({} in a row): {}", pass, failures, e)
                    }
                }
            }
        }

        result
    }

    /// Run passes until cancelled or until too many consecutive failures
    pub async fn run(&self) -> Result<(), SyncError> {
        info!(
            "Syncing reference {} every {}s",
            self.reference_id,
            self.interval.as_secs()
        );

        loop {
            if self.cancel_token.is_cancelled() {
                break;
            }

            if let Err(e) = self.run_once().await {
                let failures = self.state.consecutive_failures();
                if self.max_consecutive_failures > 0 && failures >= self.max_consecutive_failures {
                    error!("Giving up after {} consecutive failed passes", failures);
                    self.state.set(SyncState::Terminated);
                    return Err(e);
                }
            }

            self.state.set(SyncState::Sleeping);
            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Sync stopped after {} passes", self.state.passes());
        self.state.set(SyncState::Terminated);
        Ok(())
    }
}
