//! Migration reconciliation engine.
//!
//! Moves work items between two tracking-service projects whose process
//! templates differ: resolves type and state crosswalks, replays state
//! history on the destination, keeps a resumable id ledger, and re-creates
//! links once the ledger covers the batch.

pub mod attachments;
pub mod config;
pub mod crosswalk;
pub mod error;
pub mod fields;
pub mod links;
pub mod orchestrator;
pub mod query;
pub mod replay;
pub mod result;
pub mod retry;
pub mod service;

pub use error::MigrationError;
pub use orchestrator::{Collaborators, MigrationEngine, MigrationPlan};
pub use result::MigrationSummary;
pub use retry::{RetryError, RetryPolicy};
