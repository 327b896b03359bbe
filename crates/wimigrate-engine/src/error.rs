//! Engine error model.
//!
//! Per-record and per-link failures never reach this type: they are logged
//! and counted where they happen. [`MigrationError`] is what stops a run.

use wimigrate_ledger::LedgerError;

use crate::retry::RetryError;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The ledger could not be loaded or written. Continuing would lose the
    /// record of what has been migrated.
    #[error("ledger failure: {0}")]
    Ledger(#[from] LedgerError),

    /// A call the whole run depends on (the source query, the destination
    /// type listing) failed.
    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: RetryError,
    },

    /// The cancel flag was raised between records.
    #[error("migration cancelled after {processed} record(s)")]
    Cancelled { processed: usize },

    /// Configuration or other host-side failure.
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}
