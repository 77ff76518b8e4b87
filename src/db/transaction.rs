use mongodb::bson::Document;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;

use super::{InsertOutcome, StoreError};
use crate::api::paylink::TransactionDetail;

/// Field every stored detail document is addressed by
pub const TRANSACTION_ID_FIELD: &str = "transactionId";

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Filter matching the record for one transaction ID
pub fn transaction_filter(transaction_id: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(TRANSACTION_ID_FIELD, transaction_id);
    filter
}

/// Check whether a record with this transaction ID is already stored
pub async fn transaction_exists(
    collection: &Collection<Document>,
    transaction_id: &str,
) -> Result<bool, StoreError> {
    let count = collection
        .count_documents(transaction_filter(transaction_id))
        .await
        .map_err(|e| StoreError::from_mongo(e, StoreError::Query))?;

    Ok(count > 0)
}

/// Insert a detail document exactly as fetched
///
/// Uniqueness is not checked here. A duplicate-key rejection (only possible
/// when the unique index is enabled) is reported as `AlreadyExists`.
pub async fn insert_transaction(
    collection: &Collection<Document>,
    detail: &TransactionDetail,
) -> Result<InsertOutcome, StoreError> {
    let document = detail_to_document(detail)?;

    match collection.insert_one(document).await {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::AlreadyExists),
        Err(e) => Err(StoreError::from_mongo(e, StoreError::Write)),
    }
}

/// Convert the JSON detail into a BSON document, field for field
pub fn detail_to_document(detail: &TransactionDetail) -> Result<Document, StoreError> {
    mongodb::bson::to_document(detail).map_err(|e| StoreError::Encode(e.to_string()))
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}
