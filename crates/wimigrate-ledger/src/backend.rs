//! Ledger backend trait definition.

use std::collections::BTreeMap;

use wimigrate_types::WorkItemId;

use crate::error;

/// Source id to destination id, ordered by source id.
pub type LedgerEntries = BTreeMap<WorkItemId, WorkItemId>;

/// Storage contract for the migration ledger.
///
/// `persist` must replace the stored mapping with exactly `entries`; it is a
/// full rewrite, never an append.
pub trait LedgerBackend: Send + Sync {
    /// Read every stored mapping. A backend with nothing stored yet returns
    /// an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`](crate::error::LedgerError) on storage failure.
    fn load(&self) -> error::Result<LedgerEntries>;

    /// Replace the stored mapping with `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`](crate::error::LedgerError) on storage failure.
    fn persist(&self, entries: &LedgerEntries) -> error::Result<()>;

    /// Human-readable location for log lines.
    fn location(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify the trait is object-safe (can be used as `dyn LedgerBackend`).
    #[test]
    fn trait_is_object_safe() {
        fn _assert_object_safe(_: &dyn LedgerBackend) {}
    }
}
