pub mod client;
pub mod models;

pub use client::PaylinkClient;
pub use models::{ApiError, TransactionDetail, TransactionSummary};
