//! Upstream payment API access

use async_trait::async_trait;

pub mod paylink;

use paylink::{ApiError, TransactionDetail, TransactionSummary};

/// Where a sync pass discovers transactions and fetches their detail
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn list_transactions(
        &self,
        reference_id: &str,
    ) -> Result<Vec<TransactionSummary>, ApiError>;

    async fn fetch_detail(&self, transaction_id: &str) -> Result<TransactionDetail, ApiError>;
}
