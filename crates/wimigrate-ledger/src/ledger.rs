//! In-memory source-to-destination mapping over a [`LedgerBackend`].

use wimigrate_types::WorkItemId;

use crate::backend::{LedgerBackend, LedgerEntries};
use crate::error::{self, LedgerError};

/// Which source records have already been migrated, and to what.
///
/// Holds at most one entry per source id. Entries are only ever added; an
/// existing mapping is never revised. This is the single gate both for
/// skipping already-migrated records and for link creation.
pub struct MigrationLedger {
    backend: Box<dyn LedgerBackend>,
    entries: LedgerEntries,
}

impl MigrationLedger {
    /// Load the ledger from `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the backend cannot be read.
    pub fn open(backend: Box<dyn LedgerBackend>) -> error::Result<Self> {
        let entries = backend.load()?;
        tracing::info!(
            ledger = backend.location(),
            entries = entries.len(),
            "Loaded migration ledger"
        );
        Ok(Self { backend, entries })
    }

    #[must_use]
    pub fn contains(&self, source_id: WorkItemId) -> bool {
        self.entries.contains_key(&source_id)
    }

    #[must_use]
    pub fn destination_of(&self, source_id: WorkItemId) -> Option<WorkItemId> {
        self.entries.get(&source_id).copied()
    }

    /// Add a mapping in memory. Call [`persist`](Self::persist) to store it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateSource`] if `source_id` is already
    /// mapped.
    pub fn record(&mut self, source_id: WorkItemId, destination_id: WorkItemId) -> error::Result<()> {
        if let Some(&existing) = self.entries.get(&source_id) {
            return Err(LedgerError::DuplicateSource { source_id, existing });
        }
        self.entries.insert(source_id, destination_id);
        Ok(())
    }

    /// Rewrite the backend so it reflects exactly the current entries.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the backend cannot be written.
    pub fn persist(&self) -> error::Result<()> {
        self.backend.persist(&self.entries)
    }

    #[must_use]
    pub fn entries(&self) -> &LedgerEntries {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.backend.location()
    }
}

impl std::fmt::Debug for MigrationLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationLedger")
            .field("location", &self.backend.location())
            .field("entries", &self.entries.len())
            .finish()
    }
}
