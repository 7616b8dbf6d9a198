//! Local-to-remote migration results

use serde::Serialize;

use super::Platform;

/// Outcome of one `sync_local_to_remote` run
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Local records inserted remotely
    pub migrated: usize,
    /// Local records that already existed remotely and were dropped
    pub duplicates: usize,
    /// Local records left in place because the remote insert failed
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    /// Records migrated or recognized as already present remotely.
    #[must_use]
    pub fn migrated_count(&self) -> usize {
        self.migrated + self.duplicates
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// `true` when no local record was touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.migrated_count() == 0 && self.failures.is_empty()
    }
}

/// A local record that could not be migrated
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub local_id: String,
    pub platform: Platform,
    pub username: String,
    pub reason: String,
}
