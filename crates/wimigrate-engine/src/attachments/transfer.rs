//! Moving attachment bytes from the source store to a destination draft.
//!
//! Downloads land in `<root>/<source id>/`. A record directory that already
//! exists is taken as downloaded by an earlier run and left alone. Uploads
//! prefer the id-prefixed file written for colliding names, falling back to
//! the plain name.

use std::path::{Path, PathBuf};

use wimigrate_types::attachment::AttachmentRef;
use wimigrate_types::draft::WorkItemDraft;
use wimigrate_types::record::WorkItemRecord;
use wimigrate_types::WorkItemId;

use crate::attachments::paths;
use crate::retry::RetryPolicy;
use crate::service::AttachmentStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub downloaded: usize,
    pub uploaded: usize,
    pub failed: usize,
    /// The record directory already existed, so nothing was downloaded.
    pub reused_directory: bool,
}

pub struct AttachmentTransfer<'a> {
    root: &'a Path,
    retry: &'a RetryPolicy,
}

impl<'a> AttachmentTransfer<'a> {
    #[must_use]
    pub fn new(root: &'a Path, retry: &'a RetryPolicy) -> Self {
        Self { root, retry }
    }

    #[must_use]
    pub fn record_dir(&self, source_id: WorkItemId) -> PathBuf {
        self.root.join(source_id.to_string())
    }

    /// Download targets for the attachments of `record`. Attachments whose
    /// path cannot be normalised are logged and left out.
    #[must_use]
    pub fn resolve(&self, record: &WorkItemRecord) -> Vec<AttachmentRef> {
        let dir = self.record_dir(record.id);
        record
            .attachments
            .iter()
            .filter_map(|attachment| {
                match paths::download_path(&dir, attachment, &record.attachments) {
                    Ok(resolved_path) => Some(AttachmentRef {
                        parent: record.id,
                        attachment_id: attachment.id,
                        display_name: attachment.name.clone(),
                        resolved_path,
                    }),
                    Err(e) => {
                        tracing::warn!(source_id = %record.id, attachment = attachment.name, error = %e, "Cannot place attachment");
                        None
                    }
                }
            })
            .collect()
    }

    /// Fetch every attachment of `record` to local disk.
    pub fn download(&self, store: &mut dyn AttachmentStore, record: &WorkItemRecord) -> TransferReport {
        let mut report = TransferReport::default();
        if record.attachments.is_empty() {
            return report;
        }

        let dir = self.record_dir(record.id);
        if dir.exists() {
            tracing::debug!(source_id = %record.id, dir = %dir.display(), "Attachment folder exists, skipping download");
            report.reused_directory = true;
            return report;
        }
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::error!(source_id = %record.id, dir = %dir.display(), error = %e, "Cannot create attachment folder");
            report.failed = record.attachments.len();
            return report;
        }

        let targets = self.resolve(record);
        report.failed = record.attachments.len() - targets.len();
        for target in &targets {
            let Some(attachment) = record.attachments.iter().find(|a| a.id == target.attachment_id) else {
                continue;
            };
            let context = format!("DownloadAttachment: {} of {}", attachment.id, record.id);
            match self
                .retry
                .execute_unit(&context, || store.download(&attachment.uri, &target.resolved_path))
            {
                Ok(()) => report.downloaded += 1,
                Err(e) => {
                    tracing::info!(
                        source_id = %record.id,
                        work_item_type = record.type_name,
                        attachment = target.display_name,
                        error = %e,
                        "Error downloading attachment"
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Upload the downloaded files of `record` and queue them on `draft`.
    pub fn upload(
        &self,
        store: &mut dyn AttachmentStore,
        record: &WorkItemRecord,
        draft: &mut WorkItemDraft,
    ) -> TransferReport {
        let mut report = TransferReport::default();
        let dir = self.record_dir(record.id);

        for attachment in &record.attachments {
            let local = paths::unique_path(&dir, attachment)
                .ok()
                .filter(|p| p.exists())
                .or_else(|| paths::ensure_allowed_length(&dir, &attachment.name).ok())
                .filter(|p| p.exists());
            let Some(local) = local else {
                tracing::error!(source_id = %record.id, attachment = attachment.name, "Attachment file missing, not uploaded");
                report.failed += 1;
                continue;
            };

            let context = format!("UploadAttachment: {} of {}", attachment.id, record.id);
            match self
                .retry
                .execute(&context, || store.upload(&local, &attachment.comment))
            {
                Ok(uploaded) => {
                    draft.add_attachment(uploaded);
                    report.uploaded += 1;
                }
                Err(e) => {
                    tracing::error!(source_id = %record.id, attachment = attachment.name, error = %e, "Error saving attachment");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wimigrate_types::attachment::{Attachment, UploadedAttachment};
    use wimigrate_types::error::ServiceError;

    #[derive(Default)]
    struct DiskStore {
        blobs: HashMap<String, Vec<u8>>,
        flaky_downloads: usize,
        uploads: Vec<PathBuf>,
    }

    impl AttachmentStore for DiskStore {
        fn download(&mut self, uri: &str, target: &Path) -> Result<(), ServiceError> {
            if self.flaky_downloads > 0 {
                self.flaky_downloads -= 1;
                return Err(ServiceError::attachment_io("ATT_IO", "connection reset"));
            }
            let bytes = self
                .blobs
                .get(uri)
                .ok_or_else(|| ServiceError::not_found("ATT_404", uri.to_string()))?;
            std::fs::write(target, bytes).map_err(|e| ServiceError::attachment_io("ATT_IO", e.to_string()))
        }

        fn upload(&mut self, source: &Path, comment: &str) -> Result<UploadedAttachment, ServiceError> {
            self.uploads.push(source.to_path_buf());
            Ok(UploadedAttachment {
                name: source.file_name().unwrap().to_string_lossy().into_owned(),
                comment: comment.to_string(),
                handle: format!("blob-{}", self.uploads.len()),
            })
        }
    }

    fn record_with(attachments: Vec<Attachment>) -> WorkItemRecord {
        let mut r = WorkItemRecord::new(WorkItemId::new(77), "Bug");
        r.attachments = attachments;
        r
    }

    fn att(id: u32, name: &str) -> Attachment {
        Attachment {
            id,
            name: name.into(),
            uri: format!("att://{id}"),
            comment: format!("comment {id}"),
        }
    }

    #[test]
    fn download_then_upload_keeps_colliding_names_apart() {
        let root = tempfile::tempdir().unwrap();
        let retry = RetryPolicy::immediate(3);
        let transfer = AttachmentTransfer::new(root.path(), &retry);
        let mut store = DiskStore {
            flaky_downloads: 1,
            ..DiskStore::default()
        };
        store.blobs.insert("att://1".into(), b"one".to_vec());
        store.blobs.insert("att://2".into(), b"two".to_vec());
        let record = record_with(vec![att(1, "log.txt"), att(2, "Log.TXT")]);

        let report = transfer.download(&mut store, &record);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failed, 0);
        let dir = root.path().join("77");
        assert_eq!(std::fs::read(dir.join("1_log.txt")).unwrap(), b"one");
        assert_eq!(std::fs::read(dir.join("2_Log.TXT")).unwrap(), b"two");

        let mut draft = WorkItemDraft::new("Bug", Vec::new());
        let report = transfer.upload(&mut store, &record, &mut draft);
        assert_eq!(report.uploaded, 2);
        assert_eq!(draft.attachments.len(), 2);
        assert_eq!(draft.attachments[0].comment, "comment 1");
        assert!(store.uploads[0].ends_with("77/1_log.txt"));
    }

    #[test]
    fn existing_folder_skips_download() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("77")).unwrap();
        let retry = RetryPolicy::immediate(1);
        let transfer = AttachmentTransfer::new(root.path(), &retry);
        let mut store = DiskStore::default();

        let report = transfer.download(&mut store, &record_with(vec![att(1, "a.txt")]));
        assert!(report.reused_directory);
        assert_eq!(report.downloaded, 0);
    }

    #[test]
    fn missing_blob_is_counted_not_fatal() {
        let root = tempfile::tempdir().unwrap();
        let retry = RetryPolicy::immediate(2);
        let transfer = AttachmentTransfer::new(root.path(), &retry);
        let mut store = DiskStore::default();
        store.blobs.insert("att://2".into(), b"ok".to_vec());
        let record = record_with(vec![att(1, "gone.txt"), att(2, "ok.txt")]);

        let report = transfer.download(&mut store, &record);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.failed, 1);

        let mut draft = WorkItemDraft::new("Bug", Vec::new());
        let report = transfer.upload(&mut store, &record, &mut draft);
        assert_eq!(report.uploaded, 1);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn traversal_names_are_written_inside_the_record_folder() {
        let root = tempfile::tempdir().unwrap();
        let retry = RetryPolicy::immediate(1);
        let transfer = AttachmentTransfer::new(root.path(), &retry);
        let mut store = DiskStore::default();
        store.blobs.insert("att://1".into(), b"payload".to_vec());
        store.blobs.insert("att://2".into(), b"never".to_vec());
        let record = record_with(vec![att(1, "../../escape.txt"), att(2, "..")]);

        let report = transfer.download(&mut store, &record);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(std::fs::read(root.path().join("77/escape.txt")).unwrap(), b"payload");
        assert!(!root.path().join("escape.txt").exists());
        assert!(!root.path().parent().unwrap().join("escape.txt").exists());

        let mut draft = WorkItemDraft::new("Bug", Vec::new());
        let report = transfer.upload(&mut store, &record, &mut draft);
        assert_eq!(report.uploaded, 1);
        assert_eq!(report.failed, 1);
        assert!(store.uploads[0].ends_with("77/escape.txt"));
    }
}
