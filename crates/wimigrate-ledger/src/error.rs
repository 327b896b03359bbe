//! Ledger error types.

use std::path::PathBuf;

use wimigrate_types::WorkItemId;

/// Errors produced by ledger storage and bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger file or its directory could not be read or written.
    #[error("ledger i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A second mapping was offered for a source id already in the ledger.
    #[error("source id {source_id} is already mapped to {existing}")]
    DuplicateSource {
        source_id: WorkItemId,
        existing: WorkItemId,
    },

    /// Internal mutex was poisoned by a panicked thread.
    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = LedgerError::io(
            "Map/ID_map_a_to_b.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("Map/ID_map_a_to_b.txt"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn duplicate_displays_both_ids() {
        let err = LedgerError::DuplicateSource {
            source_id: WorkItemId::new(3),
            existing: WorkItemId::new(40),
        };
        assert_eq!(err.to_string(), "source id 3 is already mapped to 40");
    }

    #[test]
    fn lock_poisoned_displays() {
        assert_eq!(LedgerError::LockPoisoned.to_string(), "ledger lock poisoned");
    }
}
