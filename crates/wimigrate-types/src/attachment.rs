//! Attachment descriptors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::WorkItemId;

/// File attached to a source work item. The bytes live in the remote
/// attachment store and are fetched through `uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u32,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub comment: String,
}

/// An attachment resolved to a local file path for transfer.
///
/// `resolved_path` is derived from the display name and the parent's id and is
/// not authoritative: the attachment store owns the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub parent: WorkItemId,
    pub attachment_id: u32,
    pub display_name: String,
    pub resolved_path: PathBuf,
}

/// Handle returned by the attachment store after an upload; queued on a draft
/// and committed with the next save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAttachment {
    pub name: String,
    pub comment: String,
    pub handle: String,
}
