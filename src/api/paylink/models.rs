use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// One entry of the list endpoint response
///
/// Only `transactionId` is required; the remaining fields fall back to their
/// zero value when the upstream omits them or sends `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionSummary {
    #[serde(rename = "transactionId")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: f64,
    #[serde(rename = "dtTransaction", default, deserialize_with = "null_as_default")]
    pub date: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Full detail document for one transaction, persisted as-is
pub type TransactionDetail = serde_json::Map<String, serde_json::Value>;

/// Errors returned by the payment API client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Connection, timeout or body read failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// Body is not the expected JSON shape
    #[error("Decode error: {0}")]
    Decode(String),
    /// Non-2xx response
    #[error("HTTP error ({status}): {body}")]
    Status { status: u16, body: String },
    /// Credential could not be encoded as a header value
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },
}

impl ApiError {
    /// Whether the same call may succeed on a later pass
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            ApiError::Decode(_) | ApiError::InvalidHeader { .. } => false,
        }
    }
}
