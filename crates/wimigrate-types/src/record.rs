//! Read-only snapshot of a source work item.

use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::field::{FieldSet, REASON_FIELD, STATE_FIELD, TITLE_FIELD};
use crate::link::{ExternalLink, WorkItemLink};
use crate::WorkItemId;

/// One revision of a work item, reduced to what state replay needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Revision {
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            reason: None,
        }
    }
}

/// Snapshot of a work item as returned by a source query.
///
/// The engine never mutates these; they are read fresh on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemRecord {
    pub id: WorkItemId,
    pub type_name: String,
    #[serde(default)]
    pub fields: FieldSet,
    /// Revision trail, oldest first.
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub links: Vec<WorkItemLink>,
    #[serde(default)]
    pub external_links: Vec<ExternalLink>,
}

impl WorkItemRecord {
    #[must_use]
    pub fn new(id: WorkItemId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            fields: FieldSet::new(),
            revisions: Vec::new(),
            attachments: Vec::new(),
            links: Vec::new(),
            external_links: Vec::new(),
        }
    }

    /// Current lifecycle state: the `State` field, or the newest revision.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.fields
            .text(STATE_FIELD)
            .or_else(|| self.revisions.last().map(|r| r.state.as_str()))
    }

    /// Reason recorded with the most recent transition.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.fields
            .text(REASON_FIELD)
            .or_else(|| self.revisions.last().and_then(|r| r.reason.as_deref()))
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.fields.text(TITLE_FIELD).unwrap_or_default()
    }

    /// State values of the revision trail with consecutive repeats collapsed.
    #[must_use]
    pub fn state_history(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for rev in &self.revisions {
            if out.last() != Some(&rev.state.as_str()) {
                out.push(&rev.state);
            }
        }
        out
    }
}
