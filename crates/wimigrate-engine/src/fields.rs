//! Field copy from a source record onto a destination draft.

use std::collections::BTreeMap;

use wimigrate_types::draft::WorkItemDraft;
use wimigrate_types::field::FieldValue;
use wimigrate_types::record::WorkItemRecord;

use crate::config::types::FieldMapping;

/// Fields holding a project-rooted path; the leading project name is
/// rewritten to the destination project.
pub const PATH_FIELDS: &[&str] = &["Iteration Path", "Area Path", "Node Name", "Team Project"];

/// Source field names containing any of these are never copied: ids are
/// assigned by the destination, and state is driven by replay.
const EXCLUDED_FRAGMENTS: &[&str] = &["ID", "State", "Reason"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldMapError {
    #[error("field map has an entry with an empty work item type")]
    EmptyType,
    #[error("field map for '{type_name}' has an empty field name")]
    EmptyName { type_name: String },
    #[error("field map for '{type_name}' maps '{field}' more than once")]
    DuplicateSource { type_name: String, field: String },
}

/// Per source type: source field name -> destination field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    by_type: BTreeMap<String, BTreeMap<String, String>>,
}

impl FieldMap {
    /// # Errors
    ///
    /// Returns [`FieldMapError`] on empty names or a source field mapped twice
    /// within one type.
    pub fn new(entries: &BTreeMap<String, Vec<FieldMapping>>) -> Result<Self, FieldMapError> {
        let mut by_type = BTreeMap::new();
        for (type_name, mappings) in entries {
            if type_name.trim().is_empty() {
                return Err(FieldMapError::EmptyType);
            }
            let mut fields = BTreeMap::new();
            for m in mappings {
                if m.source.trim().is_empty() || m.destination.trim().is_empty() {
                    return Err(FieldMapError::EmptyName {
                        type_name: type_name.clone(),
                    });
                }
                if fields.insert(m.source.clone(), m.destination.clone()).is_some() {
                    return Err(FieldMapError::DuplicateSource {
                        type_name: type_name.clone(),
                        field: m.source.clone(),
                    });
                }
            }
            by_type.insert(type_name.clone(), fields);
        }
        Ok(Self { by_type })
    }

    #[must_use]
    pub fn destination_field(&self, source_type: &str, source_field: &str) -> Option<&str> {
        self.by_type
            .get(source_type)
            .and_then(|m| m.get(source_field))
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub mapped: usize,
    pub skipped: usize,
}

pub struct FieldCopier<'a> {
    source_project: &'a str,
    destination_project: &'a str,
    field_map: &'a FieldMap,
}

impl<'a> FieldCopier<'a> {
    #[must_use]
    pub fn new(source_project: &'a str, destination_project: &'a str, field_map: &'a FieldMap) -> Self {
        Self {
            source_project,
            destination_project,
            field_map,
        }
    }

    /// Copy every eligible field of `record` onto `draft`, in source order.
    pub fn copy(&self, record: &WorkItemRecord, draft: &mut WorkItemDraft) -> CopyReport {
        let mut report = CopyReport::default();
        for (name, value) in record.fields.iter() {
            if EXCLUDED_FRAGMENTS.iter().any(|f| name.contains(f)) {
                continue;
            }

            if draft.is_editable(name) {
                let value = if PATH_FIELDS.contains(&name) {
                    self.rebase_path(record, name, value)
                } else {
                    value.clone()
                };
                if draft.set_field(name, value).is_ok() {
                    report.copied += 1;
                }
                continue;
            }

            match self.field_map.destination_field(&record.type_name, name) {
                Some(target) if draft.is_editable(target) => {
                    if draft.set_field(target, value.clone()).is_ok() {
                        report.mapped += 1;
                    }
                }
                Some(target) if draft.has_field(target) => {
                    tracing::debug!(source_id = %record.id, field = name, destination_field = target, "Mapped field is read-only on destination");
                    report.skipped += 1;
                }
                Some(target) => {
                    tracing::debug!(source_id = %record.id, field = name, destination_field = target, "Mapped field does not exist on destination");
                    report.skipped += 1;
                }
                None => {
                    tracing::debug!(source_id = %record.id, field = name, "Field has no destination counterpart");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    fn rebase_path(&self, record: &WorkItemRecord, name: &str, value: &FieldValue) -> FieldValue {
        let Some(text) = value.as_text() else {
            return value.clone();
        };
        match text.strip_prefix(self.source_project) {
            Some(rest) => FieldValue::from(format!("{}{rest}", self.destination_project)),
            None => {
                tracing::warn!(
                    source_id = %record.id,
                    field = name,
                    value = text,
                    "Path does not start with the source project, copied unchanged"
                );
                value.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wimigrate_types::draft::DraftField;
    use wimigrate_types::WorkItemId;

    fn bug_record() -> WorkItemRecord {
        let mut r = WorkItemRecord::new(WorkItemId::new(5), "Bug");
        r.fields.set("System ID", 5_i64);
        r.fields.set("Title", "Crash on save");
        r.fields.set("State", "Active");
        r.fields.set("Reason", "New defect reported");
        r.fields.set("Area Path", "Alpha\\UI");
        r.fields.set("Iteration Path", "Legacy\\Sprint 1");
        r.fields.set("Repro Steps", "Click save");
        r.fields.set("Created By", "ana");
        r
    }

    fn bug_draft() -> WorkItemDraft {
        WorkItemDraft::new(
            "Bug",
            vec![
                DraftField::editable("Title", ""),
                DraftField::editable("State", "New"),
                DraftField::editable("Area Path", "Beta"),
                DraftField::editable("Iteration Path", "Beta"),
                DraftField::editable("Steps to Reproduce", ""),
                DraftField::read_only("Created By", "svc"),
            ],
        )
    }

    fn map() -> FieldMap {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Bug".to_string(),
            vec![FieldMapping {
                source: "Repro Steps".into(),
                destination: "Steps to Reproduce".into(),
            }],
        );
        FieldMap::new(&entries).unwrap()
    }

    #[test]
    fn copies_rebases_and_maps() {
        let map = map();
        let copier = FieldCopier::new("Alpha", "Beta", &map);
        let mut draft = bug_draft();
        let report = copier.copy(&bug_record(), &mut draft);

        assert_eq!(draft.title(), "Crash on save");
        assert_eq!(draft.field("Area Path").and_then(FieldValue::as_text), Some("Beta\\UI"));
        assert_eq!(
            draft.field("Iteration Path").and_then(FieldValue::as_text),
            Some("Legacy\\Sprint 1")
        );
        assert_eq!(
            draft.field("Steps to Reproduce").and_then(FieldValue::as_text),
            Some("Click save")
        );
        assert_eq!(draft.state(), Some("New"), "state is left to replay");
        assert_eq!(
            draft.field("Created By").and_then(FieldValue::as_text),
            Some("svc")
        );
        assert_eq!(report.copied, 3);
        assert_eq!(report.mapped, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn duplicate_source_field_rejected() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Bug".to_string(),
            vec![
                FieldMapping {
                    source: "A".into(),
                    destination: "B".into(),
                },
                FieldMapping {
                    source: "A".into(),
                    destination: "C".into(),
                },
            ],
        );
        assert_eq!(
            FieldMap::new(&entries),
            Err(FieldMapError::DuplicateSource {
                type_name: "Bug".into(),
                field: "A".into()
            })
        );
    }
}
