//! Collaborator contracts consumed by the engine.
//!
//! The remote tracking-service client, the attachment store and the progress
//! display all live outside this crate. The engine drives them through these
//! traits, one call at a time, from a single thread.

use std::path::Path;
use std::sync::mpsc;

use wimigrate_types::attachment::UploadedAttachment;
use wimigrate_types::draft::{FieldIssue, WorkItemDraft};
use wimigrate_types::error::ServiceError;
use wimigrate_types::record::WorkItemRecord;
use wimigrate_types::WorkItemId;

/// Read side: the project records are migrated from.
pub trait SourceService {
    /// Run a filter expression, returning records in the order the
    /// expression specifies.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the service rejects or cannot run the query.
    fn query(&self, filter: &str) -> Result<Vec<WorkItemRecord>, ServiceError>;

    /// Fetch one record. `Ok(None)` when it no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on transport or permission failure.
    fn get(&self, id: WorkItemId) -> Result<Option<WorkItemRecord>, ServiceError>;
}

/// Write side: the project records are migrated into.
pub trait DestinationService {
    /// Every work-item type the destination project declares.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on transport failure.
    fn type_names(&self) -> Result<Vec<String>, ServiceError>;

    /// Unsaved draft of `type_name`, with the type's fields and their
    /// initial values.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the type does not exist.
    fn create(&self, type_name: &str) -> Result<WorkItemDraft, ServiceError>;

    /// Draft of an already saved record. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on transport failure.
    fn open(&self, id: WorkItemId) -> Result<Option<WorkItemDraft>, ServiceError>;

    /// Destination spelling of a relation link-type end, if registered.
    fn link_type(&self, name: &str) -> Option<String>;

    /// Destination spelling of an artifact link type, if registered.
    fn artifact_link_type(&self, name: &str) -> Option<String> {
        Some(name.to_string())
    }

    /// Field-level problems that would make `save` fail. Empty means valid.
    fn validate(&self, draft: &WorkItemDraft) -> Vec<FieldIssue>;

    /// Commit the draft, assigning an id on first save.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`]; `ServiceUnavailable` is worth retrying.
    fn save(&mut self, draft: &mut WorkItemDraft) -> Result<WorkItemId, ServiceError>;
}

/// Binary attachment storage of the two services.
pub trait AttachmentStore {
    /// Write the attachment behind `uri` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`]; `AttachmentIo` is worth retrying.
    fn download(&mut self, uri: &str, target: &Path) -> Result<(), ServiceError>;

    /// Upload a local file, returning a handle to queue on a draft.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`]; `AttachmentIo` is worth retrying.
    fn upload(&mut self, source: &Path, comment: &str) -> Result<UploadedAttachment, ServiceError>;
}

/// Receives the completed fraction of the record pass, in `[0, 1]`, at most
/// once per record and in processing order.
pub trait ProgressSink {
    fn report(&self, fraction: f64);
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64) {}
}

/// Progress delivered over a single-consumer channel, leaving threading of
/// the display to the receiver.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: mpsc::Sender<f64>,
}

impl ChannelProgress {
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<f64>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, fraction: f64) {
        if self.tx.send(fraction.clamp(0.0, 1.0)).is_err() {
            tracing::debug!("Progress receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _source(_: &dyn SourceService) {}
        fn _destination(_: &mut dyn DestinationService) {}
        fn _store(_: &mut dyn AttachmentStore) {}
        fn _progress(_: &dyn ProgressSink) {}
    }

    #[test]
    fn channel_progress_clamps_and_survives_dropped_receiver() {
        let (sink, rx) = ChannelProgress::channel();
        sink.report(0.5);
        sink.report(1.5);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![0.5, 1.0]);
        drop(rx);
        sink.report(0.75);
    }
}
