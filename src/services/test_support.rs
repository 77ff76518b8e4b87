//! In-memory source and store used by the engine and scheduler tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::paylink::{ApiError, TransactionDetail, TransactionSummary};
use crate::api::TransactionSource;
use crate::db::{InsertOutcome, StoreError, TransactionStore};

pub fn summary(id: &str) -> TransactionSummary {
    TransactionSummary {
        id: id.to_string(),
        amount: "1.00".to_string(),
        status: 1.0,
        date: "2019-03-01T10:00:00".to_string(),
    }
}

pub fn detail(value: Value) -> TransactionDetail {
    match value {
        Value::Object(map) => map,
        other => panic!("detail must be an object, got {}", other),
    }
}

/// Upstream with a fixed list and per-ID detail responses
pub struct FakeSource {
    pub list: Mutex<Result<Vec<TransactionSummary>, ApiError>>,
    pub details: HashMap<String, Result<TransactionDetail, ApiError>>,
    pub list_calls: Mutex<u32>,
    pub detail_calls: Mutex<Vec<String>>,
}

impl FakeSource {
    /// Every listed ID gets a detail of `{transactionId, amount}`
    pub fn with_ids(ids: &[&str]) -> Self {
        let details = ids
            .iter()
            .map(|id| {
                let d = detail(json!({ "transactionId": id, "amount": "1.00" }));
                (id.to_string(), Ok(d))
            })
            .collect();

        Self {
            list: Mutex::new(Ok(ids.iter().map(|id| summary(id)).collect())),
            details,
            list_calls: Mutex::new(0),
            detail_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_list(error: ApiError) -> Self {
        let source = Self::with_ids(&[]);
        *source.list.lock().unwrap() = Err(error);
        source
    }

    pub fn set_detail(&mut self, id: &str, response: Result<TransactionDetail, ApiError>) {
        self.details.insert(id.to_string(), response);
    }

    pub fn set_list(&self, response: Result<Vec<TransactionSummary>, ApiError>) {
        *self.list.lock().unwrap() = response;
    }

    pub fn list_calls(&self) -> u32 {
        *self.list_calls.lock().unwrap()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSource for FakeSource {
    async fn list_transactions(
        &self,
        _reference_id: &str,
    ) -> Result<Vec<TransactionSummary>, ApiError> {
        *self.list_calls.lock().unwrap() += 1;
        self.list.lock().unwrap().clone()
    }

    async fn fetch_detail(&self, transaction_id: &str) -> Result<TransactionDetail, ApiError> {
        self.detail_calls.lock().unwrap().push(transaction_id.to_string());
        self.details
            .get(transaction_id)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::Status { status: 404, body: String::new() }))
    }
}

/// Collection kept as a vector of detail documents
#[derive(Default)]
pub struct FakeStore {
    pub records: Mutex<Vec<TransactionDetail>>,
    pub insert_calls: Mutex<Vec<TransactionDetail>>,
    pub exists_calls: Mutex<Vec<String>>,
    pub fail_exists: Option<StoreError>,
    pub fail_insert: Option<StoreError>,
    /// Existence check always answers "absent", as if another writer raced us
    pub stale_exists: bool,
    /// Reject inserts of an already stored ID, like a unique index
    pub unique_index: bool,
}

impl FakeStore {
    pub fn with_records(records: Vec<TransactionDetail>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<TransactionDetail> {
        self.records.lock().unwrap().clone()
    }

    pub fn insert_calls(&self) -> Vec<TransactionDetail> {
        self.insert_calls.lock().unwrap().clone()
    }

    fn contains(&self, transaction_id: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.get("transactionId").and_then(Value::as_str) == Some(transaction_id))
    }
}

#[async_trait]
impl TransactionStore for FakeStore {
    async fn exists(&self, transaction_id: &str) -> Result<bool, StoreError> {
        self.exists_calls.lock().unwrap().push(transaction_id.to_string());
        if let Some(err) = &self.fail_exists {
            return Err(err.clone());
        }
        if self.stale_exists {
            return Ok(false);
        }
        Ok(self.contains(transaction_id))
    }

    async fn insert(&self, detail: &TransactionDetail) -> Result<InsertOutcome, StoreError> {
        self.insert_calls.lock().unwrap().push(detail.clone());
        if let Some(err) = &self.fail_insert {
            return Err(err.clone());
        }

        let id = detail.get("transactionId").and_then(Value::as_str).unwrap_or_default();
        if self.unique_index && self.contains(id) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        self.records.lock().unwrap().push(detail.clone());
        Ok(InsertOutcome::Inserted)
    }
}
