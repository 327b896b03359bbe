//! Second pass: re-creating links once the ledger covers the batch.
//!
//! A link is only created when both ends have a ledger entry. Related links
//! are reciprocal on the destination, so once a record's links have been
//! processed, links pointing back at it from later records are not created
//! again. Duplicate suppression is run-local; a resumed run may recreate a
//! link saved before an interruption.

use std::collections::HashSet;

use wimigrate_ledger::MigrationLedger;
use wimigrate_types::draft::WorkItemDraft;
use wimigrate_types::link::{ExternalLink, ExternalLinkKind, RelatedLink};
use wimigrate_types::record::WorkItemRecord;
use wimigrate_types::WorkItemId;

use crate::retry::RetryPolicy;
use crate::service::{DestinationService, SourceService};

/// URI schemes accepted on external links.
pub const ALLOWED_SCHEMES: &[&str] = &[
    "http",
    "https",
    "ftp",
    "gopher",
    "mailto",
    "news",
    "telnet",
    "wais",
    "vstfs",
    "tfs",
    "alm",
    "mtm",
    "mtms",
    "mtr",
    "mtrs",
    "mfbclient",
    "mfbclients",
    "test-runner",
    "x-mvwit",
    "onenote",
    "codeflow",
    "file",
    "tel",
    "skype",
];

/// True when `uri` starts with `<scheme>://` for an allowed scheme.
#[must_use]
pub fn is_valid_uri(uri: &str) -> bool {
    ALLOWED_SCHEMES.iter().any(|scheme| {
        uri.strip_prefix(scheme)
            .is_some_and(|rest| rest.starts_with("://"))
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub created: usize,
    pub skipped: usize,
}

pub struct LinkResolver<'a> {
    ledger: &'a MigrationLedger,
    retry: &'a RetryPolicy,
    source_segment: String,
    destination_segment: String,
    /// Source records whose related links have been processed this run.
    linked: HashSet<WorkItemId>,
}

impl<'a> LinkResolver<'a> {
    /// `source_segment` and `destination_segment` are the project identifiers
    /// embedded in artifact URIs.
    #[must_use]
    pub fn new(
        ledger: &'a MigrationLedger,
        retry: &'a RetryPolicy,
        source_segment: impl Into<String>,
        destination_segment: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            retry,
            source_segment: source_segment.into(),
            destination_segment: destination_segment.into(),
            linked: HashSet::new(),
        }
    }

    /// Re-create work-item-to-work-item links for `records`, in order.
    pub fn create_links(
        &mut self,
        source: &dyn SourceService,
        destination: &mut dyn DestinationService,
        records: &[WorkItemRecord],
    ) -> LinkReport {
        let mut report = LinkReport::default();
        for record in records.iter().filter(|r| !r.links.is_empty()) {
            let Some(mut draft) = self.open_counterpart(destination, record) else {
                report.skipped += record.links.len();
                continue;
            };

            let mut seen = HashSet::new();
            let mut pending = 0;
            for link in &record.links {
                if !seen.insert((link.target, link.link_type.as_str())) {
                    continue;
                }
                if self.linked.contains(&link.target) {
                    tracing::debug!(source_id = %record.id, target = %link.target, "Reciprocal link already exists");
                    continue;
                }
                let Some(target) = self.ledger.destination_of(link.target) else {
                    tracing::warn!(
                        source_id = %record.id,
                        target = %link.target,
                        "Link target has not been migrated, link skipped"
                    );
                    report.skipped += 1;
                    continue;
                };
                let context = format!("RetryGetWorkItem: source {}", link.target);
                match self.retry.execute(&context, || source.get(link.target)) {
                    Ok(Some(_)) => {}
                    Ok(None) | Err(_) => {
                        tracing::warn!(source_id = %record.id, target = %link.target, "Link target no longer exists in source");
                        report.skipped += 1;
                        continue;
                    }
                }
                let Some(link_type) = destination.link_type(&link.link_type) else {
                    tracing::warn!(source_id = %record.id, link_type = link.link_type, "Link type unknown to destination");
                    report.skipped += 1;
                    continue;
                };

                draft.add_link(RelatedLink { link_type, target });
                let issues = destination.validate(&draft);
                if issues.is_empty() {
                    pending += 1;
                } else {
                    draft.links.pop();
                    for issue in &issues {
                        tracing::info!(
                            source_id = %record.id,
                            target = %link.target,
                            field = issue.field,
                            message = issue.message,
                            "Link rejected by validation"
                        );
                    }
                    report.skipped += 1;
                }
            }

            if pending > 0 {
                if self.save(destination, record, &mut draft) {
                    tracing::info!(source_id = %record.id, links = pending, "Links created");
                    report.created += pending;
                } else {
                    report.skipped += pending;
                }
            }
            self.linked.insert(record.id);
        }
        report
    }

    /// Re-create hyperlinks and artifact links, rewriting the project
    /// identifier inside each URI.
    pub fn create_external_links(
        &self,
        destination: &mut dyn DestinationService,
        records: &[WorkItemRecord],
    ) -> LinkReport {
        let mut report = LinkReport::default();
        for record in records.iter().filter(|r| !r.external_links.is_empty()) {
            let Some(mut draft) = self.open_counterpart(destination, record) else {
                report.skipped += record.external_links.len();
                continue;
            };

            let mut pending = 0;
            for link in &record.external_links {
                match self.translate(destination, link) {
                    Ok(translated) if draft.external_links.contains(&translated) => {
                        tracing::debug!(source_id = %record.id, uri = translated.uri, "External link already present");
                    }
                    Ok(translated) => {
                        draft.add_external_link(translated);
                        pending += 1;
                    }
                    Err(why) => {
                        tracing::warn!(source_id = %record.id, uri = link.uri, why, "External link dropped");
                        report.skipped += 1;
                    }
                }
            }

            if pending > 0 {
                if self.save(destination, record, &mut draft) {
                    report.created += pending;
                } else {
                    report.skipped += pending;
                }
            }
        }
        report
    }

    fn translate(
        &self,
        destination: &dyn DestinationService,
        link: &ExternalLink,
    ) -> Result<ExternalLink, &'static str> {
        if link.is_changeset() {
            return Err("changeset links are not migrated");
        }
        let uri = link
            .uri
            .replace(&self.source_segment, &self.destination_segment);
        if !is_valid_uri(&uri) {
            return Err("invalid uri");
        }
        match &link.kind {
            ExternalLinkKind::Hyperlink => Ok(ExternalLink::hyperlink(uri)),
            ExternalLinkKind::Artifact { artifact_type } => destination
                .artifact_link_type(artifact_type)
                .map(|ty| ExternalLink::artifact(ty, uri))
                .ok_or("artifact link type unknown to destination"),
        }
    }

    fn open_counterpart(
        &self,
        destination: &dyn DestinationService,
        record: &WorkItemRecord,
    ) -> Option<WorkItemDraft> {
        let Some(id) = self.ledger.destination_of(record.id) else {
            tracing::info!(source_id = %record.id, "Work item not migrated, links skipped");
            return None;
        };
        let context = format!("RetryGetWorkItem: destination {id}");
        match self.retry.execute(&context, || destination.open(id)) {
            Ok(Some(draft)) => Some(draft),
            Ok(None) => {
                tracing::warn!(source_id = %record.id, destination_id = %id, "Migrated work item missing from destination");
                None
            }
            Err(e) => {
                tracing::error!(source_id = %record.id, destination_id = %id, error = %e, "Cannot open migrated work item");
                None
            }
        }
    }

    fn save(
        &self,
        destination: &mut dyn DestinationService,
        record: &WorkItemRecord,
        draft: &mut WorkItemDraft,
    ) -> bool {
        let context = format!("SaveWorkItem: {} {}", draft.type_name(), draft.title());
        match self.retry.execute(&context, || destination.save(draft)) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(source_id = %record.id, error = %e, "Error saving links");
                false
            }
        }
    }
}
