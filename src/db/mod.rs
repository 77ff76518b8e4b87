use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use thiserror::Error;
use tracing::info;

use crate::api::paylink::TransactionDetail;
use crate::config::SyncConfig;

pub mod transaction;

/// Document store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),
    #[error("Store query error: {0}")]
    Query(String),
    #[error("Store write error: {0}")]
    Write(String),
    #[error("Failed to encode document: {0}")]
    Encode(String),
}

impl StoreError {
    /// Map a driver error, keeping network-level failures distinguishable
    pub fn from_mongo(err: mongodb::error::Error, otherwise: fn(String) -> StoreError) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::ConnectionPoolCleared { .. } => StoreError::Connection(err.to_string()),
            _ => otherwise(err.to_string()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

/// Result of an insert attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Rejected by the unique index; another writer got there first
    AlreadyExists,
}

/// Durable record of every transaction seen so far
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn exists(&self, transaction_id: &str) -> Result<bool, StoreError>;

    async fn insert(&self, detail: &TransactionDetail) -> Result<InsertOutcome, StoreError>;
}

/// MongoDB collection holding one document per transaction
#[derive(Clone)]
pub struct MongoTransactionStore {
    collection: Collection<Document>,
}

impl MongoTransactionStore {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl TransactionStore for MongoTransactionStore {
    async fn exists(&self, transaction_id: &str) -> Result<bool, StoreError> {
        transaction::transaction_exists(&self.collection, transaction_id).await
    }

    async fn insert(&self, detail: &TransactionDetail) -> Result<InsertOutcome, StoreError> {
        transaction::insert_transaction(&self.collection, detail).await
    }
}

/// Connect to MongoDB and select the target collection
///
/// The returned handle is shared for the lifetime of the process.
pub async fn init_store(config: &SyncConfig) -> Result<MongoTransactionStore, StoreError> {
    let client = Client::with_uri_str(&config.mongo_uri)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    // Driver connects lazily; ping so a bad URI fails at startup
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| StoreError::from_mongo(e, StoreError::Connection))?;

    let collection = client
        .database(&config.database_name)
        .collection::<Document>(&config.collection_name);

    if config.ensure_unique_index {
        create_unique_index(&collection).await?;
    }

    Ok(MongoTransactionStore::new(collection))
}

async fn create_unique_index(collection: &Collection<Document>) -> Result<(), StoreError> {
    let mut keys = Document::new();
    keys.insert(transaction::TRANSACTION_ID_FIELD, 1);

    let index = IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build();

    collection
        .create_index(index)
        .await
        .map_err(|e| StoreError::from_mongo(e, StoreError::Write))?;

    info!(
        "Unique index on {} ensured for {}",
        transaction::TRANSACTION_ID_FIELD,
        collection.namespace()
    );
    Ok(())
}
