//! Shared work-item, link, attachment and error model types.
//!
//! This crate holds pure data only. Both the ledger and the engine depend on
//! it, and neither the remote tracking service nor the file system is touched
//! from here.

pub mod attachment;
pub mod draft;
pub mod error;
pub mod field;
pub mod ids;
pub mod link;
pub mod record;
pub mod vocabulary;

pub use ids::WorkItemId;
