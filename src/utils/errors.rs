use thiserror::Error;

use crate::api::paylink::ApiError;
use crate::db::StoreError;

/// Whether a failed pass is worth repeating at the next interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    Retryable,
    Permanent,
}

/// Failure of one sync pass, tagged with the step that failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Failed to list transactions for reference {reference_id}: {source}")]
    List {
        reference_id: String,
        #[source]
        source: ApiError,
    },
    #[error("Failed to fetch detail of transaction {transaction_id}: {source}")]
    Detail {
        transaction_id: String,
        #[source]
        source: ApiError,
    },
    #[error("Store failure on transaction {transaction_id}: {source}")]
    Store {
        transaction_id: String,
        #[source]
        source: StoreError,
    },
}

impl SyncError {
    /// Classify error for the scheduler's logging and give-up policy
    pub fn retry_class(&self) -> RetryClass {
        let retryable = match self {
            SyncError::List { source, .. } | SyncError::Detail { source, .. } => source.is_retryable(),
            SyncError::Store { source, .. } => source.is_retryable(),
        };

        if retryable {
            RetryClass::Retryable
        } else {
            RetryClass::Permanent
        }
    }
}
