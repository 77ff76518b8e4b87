use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::api::TransactionSource;
use crate::db::{InsertOutcome, TransactionStore};
use crate::models::{PassReport, SharedSyncState, SyncState};
use crate::utils::errors::SyncError;

/// Run one synchronization pass for a reference ID
///
/// Lists the reference's transactions, then for each one in upstream order
/// fetches the detail, checks the store and inserts the detail if absent.
/// The first failure aborts the pass; transactions after it are left for the
/// next pass.
///
/// The existence check and the insert are two separate store calls. Two
/// overlapping passes can both see a transaction as absent and insert it
/// twice unless the collection carries a unique index on `transactionId`.
pub async fn run_pass<S, T>(
    source: &S,
    store: &T,
    reference_id: &str,
    state: &SharedSyncState,
) -> Result<PassReport, SyncError>
where
    S: TransactionSource + ?Sized,
    T: TransactionStore + ?Sized,
{
    let started = Instant::now();
    let mut report = PassReport::new(Utc::now());

    state.set(SyncState::Polling);
    let summaries = source
        .list_transactions(reference_id)
        .await
        .map_err(|source| SyncError::List {
            reference_id: reference_id.to_string(),
            source,
        })?;
    report.listed = summaries.len();
    debug!("Listed {} transactions for reference {}", summaries.len(), reference_id);

    state.set(SyncState::Syncing);
    for summary in &summaries {
        let detail = source
            .fetch_detail(&summary.id)
            .await
            .map_err(|source| SyncError::Detail {
                transaction_id: summary.id.clone(),
                source,
            })?;

        let store_err = |source| SyncError::Store {
            transaction_id: summary.id.clone(),
            source,
        };

        if store.exists(&summary.id).await.map_err(store_err)? {
            debug!("Transaction {} already stored", summary.id);
            report.skipped += 1;
            continue;
        }

        match store.insert(&detail).await.map_err(store_err)? {
            InsertOutcome::Inserted => {
                info!("Transaction of ID {} inserted", summary.id);
                report.inserted += 1;
            }
            InsertOutcome::AlreadyExists => {
                warn!(
                    "Transaction {} was absent at check time but rejected as duplicate on insert",
                    summary.id
                );
                report.lost_races += 1;
            }
        }
    }

    report.elapsed_ms = started.elapsed().as_millis() as u64;
    Ok(report)
}
