//! Link model: work-item-to-work-item relations and external URI links.

use serde::{Deserialize, Serialize};

use crate::WorkItemId;

/// Relation from one work item to another, as read from the source service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItemLink {
    pub target: WorkItemId,
    /// Link-type end name, e.g. `"Child"` or `"Related"`.
    pub link_type: String,
}

impl WorkItemLink {
    #[must_use]
    pub fn new(target: WorkItemId, link_type: impl Into<String>) -> Self {
        Self {
            target,
            link_type: link_type.into(),
        }
    }
}

/// Kind of an external link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExternalLinkKind {
    /// Plain hyperlink to an arbitrary location.
    Hyperlink,
    /// Artifact link registered under a named artifact type
    /// (e.g. `"Fixed in Changeset"`, `"Pull Request"`).
    Artifact { artifact_type: String },
}

/// URI link attached to a work item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalLink {
    pub uri: String,
    #[serde(flatten)]
    pub kind: ExternalLinkKind,
}

impl ExternalLink {
    #[must_use]
    pub fn hyperlink(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: ExternalLinkKind::Hyperlink,
        }
    }

    #[must_use]
    pub fn artifact(artifact_type: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: ExternalLinkKind::Artifact {
                artifact_type: artifact_type.into(),
            },
        }
    }

    /// Changeset artifacts are bound to the source repository and are never
    /// carried across.
    #[must_use]
    pub fn is_changeset(&self) -> bool {
        match &self.kind {
            ExternalLinkKind::Hyperlink => false,
            ExternalLinkKind::Artifact { artifact_type } => {
                artifact_type.to_ascii_lowercase().contains("changeset")
                    || self.uri.to_ascii_lowercase().contains("changeset")
            }
        }
    }
}

/// Relation queued on a destination draft, already resolved to destination ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelatedLink {
    pub link_type: String,
    pub target: WorkItemId,
}
