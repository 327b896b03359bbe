//! Resumable migration ledger.
//!
//! Provides the [`LedgerBackend`] storage contract, a pipe-delimited
//! [`FileLedger`] implementation compatible with the `Source ID|Target ID`
//! map files, an in-memory backend for tests, and the [`MigrationLedger`]
//! mapping the engine consults before migrating each record.

#![warn(clippy::pedantic)]

pub mod backend;
pub mod error;
pub mod file;
pub mod format;
pub mod ledger;
pub mod memory;

pub use backend::{LedgerBackend, LedgerEntries};
pub use error::LedgerError;
pub use file::FileLedger;
pub use ledger::MigrationLedger;
pub use memory::MemoryLedger;
