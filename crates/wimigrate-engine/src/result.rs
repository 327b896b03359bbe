//! Migration run result counters.

use serde::Serialize;

/// Aggregate outcome of one [`MigrationEngine::run`](crate::MigrationEngine::run).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationSummary {
    pub records_seen: usize,
    pub migrated: usize,
    pub already_migrated: usize,
    pub skipped_no_mapping: usize,
    pub skipped_invalid: usize,
    pub failed_saves: usize,
    pub replay_direct: usize,
    pub replay_chained: usize,
    pub replay_aborted: usize,
    pub attachments_uploaded: usize,
    pub attachments_failed: usize,
    pub links_created: usize,
    pub links_skipped: usize,
    pub external_links_created: usize,
    pub external_links_dropped: usize,
    pub duration_secs: f64,
}

impl MigrationSummary {
    /// Records that have a ledger entry at the end of the record pass.
    #[must_use]
    pub fn mapped(&self) -> usize {
        self.migrated + self.already_migrated
    }

    /// Records the record pass left without a destination counterpart.
    #[must_use]
    pub fn unmapped(&self) -> usize {
        self.skipped_no_mapping + self.skipped_invalid + self.failed_saves
    }
}
