//! Data models shared by the sync engine and scheduler

pub mod sync;

pub use sync::{PassReport, SharedSyncState, SyncState};
