//! Editable destination-side work item.
//!
//! A [`WorkItemDraft`] is handed out by the destination service (fresh for a
//! new record, or opened from an existing one), edited by the engine, then
//! validated and saved by the service. The field schema is fixed when the
//! draft is built: setting an undeclared field is an error, not an insert.

use serde::{Deserialize, Serialize};

use crate::attachment::UploadedAttachment;
use crate::field::{FieldValue, STATE_FIELD, TITLE_FIELD};
use crate::link::{ExternalLink, RelatedLink};
use crate::WorkItemId;

/// Declared field on a destination work-item type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftField {
    pub name: String,
    pub value: FieldValue,
    pub editable: bool,
}

impl DraftField {
    #[must_use]
    pub fn editable(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            editable: true,
        }
    }

    #[must_use]
    pub fn read_only(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            editable: false,
        }
    }
}

/// Rejected field write on a draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldAccessError {
    #[error("field '{0}' is not declared on this work-item type")]
    Unknown(String),
    #[error("field '{0}' is read-only")]
    ReadOnly(String),
}

/// Field-level validation failure reported by the destination schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkItemDraft {
    id: Option<WorkItemId>,
    type_name: String,
    fields: Vec<DraftField>,
    pub attachments: Vec<UploadedAttachment>,
    pub links: Vec<RelatedLink>,
    pub external_links: Vec<ExternalLink>,
    dirty: bool,
}

impl WorkItemDraft {
    /// Unsaved draft of `type_name` with its declared fields.
    #[must_use]
    pub fn new(type_name: impl Into<String>, fields: impl IntoIterator<Item = DraftField>) -> Self {
        Self {
            id: None,
            type_name: type_name.into(),
            fields: fields.into_iter().collect(),
            attachments: Vec::new(),
            links: Vec::new(),
            external_links: Vec::new(),
            dirty: true,
        }
    }

    /// Draft opened from an already saved destination record.
    #[must_use]
    pub fn opened(
        id: WorkItemId,
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = DraftField>,
    ) -> Self {
        let mut draft = Self::new(type_name, fields);
        draft.id = Some(id);
        draft.dirty = false;
        draft
    }

    #[must_use]
    pub fn id(&self) -> Option<WorkItemId> {
        self.id
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    #[must_use]
    pub fn is_editable(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name && f.editable)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn fields(&self) -> impl Iterator<Item = &DraftField> {
        self.fields.iter()
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.field(STATE_FIELD).and_then(FieldValue::as_text)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.field(TITLE_FIELD)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
    }

    /// Write a declared, editable field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldAccessError`] when the field is undeclared or read-only.
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FieldAccessError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| FieldAccessError::Unknown(name.to_string()))?;
        if !field.editable {
            return Err(FieldAccessError::ReadOnly(name.to_string()));
        }
        field.value = value.into();
        self.dirty = true;
        Ok(())
    }

    pub fn add_link(&mut self, link: RelatedLink) {
        self.links.push(link);
        self.dirty = true;
    }

    pub fn add_external_link(&mut self, link: ExternalLink) {
        self.external_links.push(link);
        self.dirty = true;
    }

    pub fn add_attachment(&mut self, attachment: UploadedAttachment) {
        self.attachments.push(attachment);
        self.dirty = true;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the destination service once a save commits.
    pub fn mark_saved(&mut self, id: WorkItemId) {
        self.id = Some(id);
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bug_draft() -> WorkItemDraft {
        WorkItemDraft::new(
            "Bug",
            vec![
                DraftField::editable("Title", ""),
                DraftField::editable("State", "New"),
                DraftField::read_only("Created Date", "2020-01-01"),
            ],
        )
    }

    #[test]
    fn set_field_rejects_undeclared_and_read_only() {
        let mut d = bug_draft();
        assert_eq!(
            d.set_field("Severity", "1"),
            Err(FieldAccessError::Unknown("Severity".into()))
        );
        assert_eq!(
            d.set_field("Created Date", "x"),
            Err(FieldAccessError::ReadOnly("Created Date".into()))
        );
        d.set_field("Title", "crash on save").unwrap();
        assert_eq!(d.title(), "crash on save");
    }

    #[test]
    fn opened_draft_is_clean_until_edited() {
        let fields: Vec<DraftField> = bug_draft().fields().cloned().collect();
        let mut d = WorkItemDraft::opened(WorkItemId::new(5), "Bug", fields);
        assert!(!d.is_dirty());
        d.set_field("State", "Active").unwrap();
        assert!(d.is_dirty());
        d.mark_saved(WorkItemId::new(5));
        assert!(!d.is_dirty());
        assert_eq!(d.state(), Some("Active"));
    }

    #[test]
    fn read_only_fields_are_declared_but_not_editable() {
        let d = bug_draft();
        assert!(d.has_field("Created Date"));
        assert!(!d.is_editable("Created Date"));
        assert!(d.has_field("Title") && d.is_editable("Title"));
        assert!(!d.has_field("Severity"));
    }
}
