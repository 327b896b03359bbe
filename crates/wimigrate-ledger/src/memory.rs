//! In-memory implementation of [`LedgerBackend`], used by tests and dry runs.
//!
//! Content is kept in the same text encoding as the file ledger so the two
//! backends exercise one parser.

use std::sync::Mutex;

use crate::backend::{LedgerBackend, LedgerEntries};
use crate::error::{self, LedgerError};
use crate::format;

#[derive(Debug, Default)]
pub struct MemoryLedger {
    text: Mutex<Option<String>>,
    persist_count: Mutex<usize>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with ledger text, as if left by an earlier run.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Some(text.into())),
            persist_count: Mutex::new(0),
        }
    }

    /// Current stored text, if anything was persisted or seeded.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LockPoisoned`] if the lock is poisoned.
    pub fn text(&self) -> error::Result<Option<String>> {
        Ok(self.text.lock().map_err(|_| LedgerError::LockPoisoned)?.clone())
    }

    /// Number of `persist` calls so far.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LockPoisoned`] if the lock is poisoned.
    pub fn persist_count(&self) -> error::Result<usize> {
        Ok(*self.persist_count.lock().map_err(|_| LedgerError::LockPoisoned)?)
    }
}

impl LedgerBackend for MemoryLedger {
    fn load(&self) -> error::Result<LedgerEntries> {
        let guard = self.text.lock().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(guard.as_deref().map(format::parse).unwrap_or_default())
    }

    fn persist(&self, entries: &LedgerEntries) -> error::Result<()> {
        *self.text.lock().map_err(|_| LedgerError::LockPoisoned)? = Some(format::render(entries));
        *self.persist_count.lock().map_err(|_| LedgerError::LockPoisoned)? += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
