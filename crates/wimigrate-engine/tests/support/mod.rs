//! In-memory stand-ins for the tracking service and attachment store.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use wimigrate_engine::service::{AttachmentStore, DestinationService, SourceService};
use wimigrate_types::attachment::UploadedAttachment;
use wimigrate_types::draft::{DraftField, FieldIssue, WorkItemDraft};
use wimigrate_types::error::ServiceError;
use wimigrate_types::record::{Revision, WorkItemRecord};
use wimigrate_types::vocabulary::ProcessVocabulary;
use wimigrate_types::WorkItemId;

pub fn id(n: u32) -> WorkItemId {
    WorkItemId::new(n)
}

/// Record with a title and a revision trail; the current state is the last
/// revision's.
pub fn record(n: u32, type_name: &str, history: &[&str], reason: Option<&str>) -> WorkItemRecord {
    let mut r = WorkItemRecord::new(id(n), type_name);
    r.fields.set("Title", format!("{type_name} {n}"));
    r.fields.set("Area Path", "Alpha\\Web");
    r.revisions = history.iter().map(|s| Revision::new(*s)).collect();
    if let (Some(last), Some(reason)) = (r.revisions.last_mut(), reason) {
        last.reason = Some(reason.to_string());
    }
    r
}

#[derive(Default)]
pub struct FakeSource {
    pub records: Vec<WorkItemRecord>,
    pub queries: Cell<usize>,
    /// Returned by `query` but no longer found by `get`.
    pub vanished: Vec<WorkItemId>,
}

impl FakeSource {
    pub fn new(records: Vec<WorkItemRecord>) -> Self {
        Self {
            records,
            queries: Cell::new(0),
            vanished: Vec::new(),
        }
    }
}

impl SourceService for FakeSource {
    fn query(&self, _filter: &str) -> Result<Vec<WorkItemRecord>, ServiceError> {
        self.queries.set(self.queries.get() + 1);
        Ok(self.records.clone())
    }

    fn get(&self, id: WorkItemId) -> Result<Option<WorkItemRecord>, ServiceError> {
        if self.vanished.contains(&id) {
            return Ok(None);
        }
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }
}

/// Destination project enforcing a per-type workflow on `State`.
pub struct FakeDestination {
    types: Vec<String>,
    initial: HashMap<String, String>,
    workflows: HashMap<String, Vec<(String, String)>>,
    pub saved: BTreeMap<WorkItemId, WorkItemDraft>,
    next_id: u32,
    /// Saves failing with `ServiceUnavailable` before one succeeds.
    pub unavailable_saves: usize,
    pub save_calls: usize,
    /// Destination ids that `validate` refuses as link targets.
    pub rejected_link_targets: Vec<WorkItemId>,
}

impl FakeDestination {
    pub fn new(vocabulary: ProcessVocabulary) -> Self {
        let types: Vec<String> = vocabulary
            .required_types()
            .iter()
            .map(|t| (*t).to_string())
            .collect();
        let mut dest = Self {
            types,
            initial: HashMap::new(),
            workflows: HashMap::new(),
            saved: BTreeMap::new(),
            next_id: 1000,
            unavailable_saves: 0,
            save_calls: 0,
            rejected_link_targets: Vec::new(),
        };
        match vocabulary {
            ProcessVocabulary::Cmmi => {
                for ty in ["Requirement", "Task", "Bug", "Issue"] {
                    dest.workflow(ty, &["Proposed", "Active", "Resolved", "Closed"]);
                }
            }
            ProcessVocabulary::Agile => {
                for ty in ["User Story", "Task", "Bug", "Issue"] {
                    dest.workflow(ty, &["New", "Active", "Resolved", "Closed"]);
                }
            }
            ProcessVocabulary::Scrum => {
                for ty in ["Product Backlog Item", "Task", "Bug", "Impediment"] {
                    dest.workflow(ty, &["New", "Approved", "Committed", "Done"]);
                }
            }
        }
        dest
    }

    /// Linear workflow: each state may move one step forward or back.
    pub fn workflow(&mut self, type_name: &str, states: &[&str]) {
        self.initial.insert(type_name.into(), states[0].into());
        let mut edges = Vec::new();
        for pair in states.windows(2) {
            edges.push((pair[0].to_string(), pair[1].to_string()));
            edges.push((pair[1].to_string(), pair[0].to_string()));
        }
        self.workflows.insert(type_name.into(), edges);
    }

    pub fn committed_state(&self, draft: &WorkItemDraft) -> String {
        draft
            .id()
            .and_then(|id| self.saved.get(&id))
            .and_then(WorkItemDraft::state)
            .or_else(|| self.initial.get(draft.type_name()).map(String::as_str))
            .unwrap_or_default()
            .to_string()
    }

    pub fn by_title(&self, title: &str) -> Option<&WorkItemDraft> {
        self.saved.values().find(|d| d.title() == title)
    }
}

impl DestinationService for FakeDestination {
    fn type_names(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.types.clone())
    }

    fn create(&self, type_name: &str) -> Result<WorkItemDraft, ServiceError> {
        let initial = self
            .initial
            .get(type_name)
            .ok_or_else(|| ServiceError::not_found("TYPE_404", type_name.to_string()))?;
        Ok(WorkItemDraft::new(
            type_name,
            vec![
                DraftField::editable("Title", ""),
                DraftField::editable("State", initial.as_str()),
                DraftField::editable("Reason", "New"),
                DraftField::editable("Area Path", "Beta"),
                DraftField::read_only("Created Date", "2026-01-01"),
            ],
        ))
    }

    fn open(&self, id: WorkItemId) -> Result<Option<WorkItemDraft>, ServiceError> {
        Ok(self.saved.get(&id).cloned())
    }

    fn link_type(&self, name: &str) -> Option<String> {
        ["Related", "Parent", "Child"]
            .iter()
            .find(|known| known.eq_ignore_ascii_case(name))
            .map(|known| (*known).to_string())
    }

    fn validate(&self, draft: &WorkItemDraft) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        if draft.title().trim().is_empty() {
            issues.push(FieldIssue::new("Title", "required"));
        }
        let from = self.committed_state(draft);
        let to = draft.state().unwrap_or_default();
        let allowed = from == to
            || self
                .workflows
                .get(draft.type_name())
                .is_some_and(|edges| edges.iter().any(|(a, b)| *a == from && b == to));
        if !allowed {
            issues.push(FieldIssue::new("State", format!("{from} -> {to} not allowed")));
        }
        for link in &draft.links {
            if self.rejected_link_targets.contains(&link.target) {
                let message = format!("{} cannot be linked", link.target);
                issues.push(FieldIssue::new("Links", message));
            }
        }
        issues
    }

    fn save(&mut self, draft: &mut WorkItemDraft) -> Result<WorkItemId, ServiceError> {
        self.save_calls += 1;
        if self.unavailable_saves > 0 {
            self.unavailable_saves -= 1;
            return Err(ServiceError::unavailable("TF_503", "service unavailable"));
        }
        let id = draft.id().unwrap_or_else(|| {
            let id = WorkItemId::new(self.next_id);
            self.next_id += 1;
            id
        });
        draft.mark_saved(id);
        self.saved.insert(id, draft.clone());
        Ok(id)
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub blobs: HashMap<String, Vec<u8>>,
    pub uploads: Vec<PathBuf>,
}

impl AttachmentStore for FakeStore {
    fn download(&mut self, uri: &str, target: &Path) -> Result<(), ServiceError> {
        let bytes = self
            .blobs
            .get(uri)
            .ok_or_else(|| ServiceError::not_found("ATT_404", uri.to_string()))?;
        std::fs::write(target, bytes).map_err(|e| ServiceError::attachment_io("ATT_IO", e.to_string()))
    }

    fn upload(&mut self, source: &Path, comment: &str) -> Result<UploadedAttachment, ServiceError> {
        self.uploads.push(source.to_path_buf());
        Ok(UploadedAttachment {
            name: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            comment: comment.to_string(),
            handle: format!("blob-{}", self.uploads.len()),
        })
    }
}
