//! Sync pass models

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};

/// Counts gathered over one pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub listed: usize,
    pub inserted: usize,
    /// Already stored before the pass looked at them
    pub skipped: usize,
    /// Absent at check time, rejected by the unique index at insert time
    pub lost_races: usize,
    pub elapsed_ms: u64,
}

impl PassReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            listed: 0,
            inserted: 0,
            skipped: 0,
            lost_races: 0,
            elapsed_ms: 0,
        }
    }
}

/// Lifecycle of the sync process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SyncState {
    Starting = 0,
    Polling = 1,
    Syncing = 2,
    Sleeping = 3,
    Terminated = 4,
}

impl SyncState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SyncState::Polling,
            2 => SyncState::Syncing,
            3 => SyncState::Sleeping,
            4 => SyncState::Terminated,
            _ => SyncState::Starting,
        }
    }
}

/// Scheduler status readable from other tasks without locking
#[derive(Debug)]
pub struct SharedSyncState {
    state: AtomicU8,
    passes: AtomicU64,
    consecutive_failures: AtomicU32,
}

impl SharedSyncState {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(SyncState::Starting as u8),
            passes: AtomicU64::new(0),
            consecutive_failures: AtomicU32::new(0),
        }
    }

    pub fn get(&self) -> SyncState {
        SyncState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set(&self, state: SyncState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Passes attempted so far, failed ones included
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Acquire)
    }

    pub fn record_pass(&self) -> u64 {
        self.passes.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    pub fn record_failure(&self) -> u32 {
        self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn reset_failures(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
    }
}

impl Default for SharedSyncState {
    fn default() -> Self {
        Self::new()
    }
}
