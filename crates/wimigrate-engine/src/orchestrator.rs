//! Migration orchestrator: record pass in ascending id order, then the link pass.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use wimigrate_ledger::MigrationLedger;
use wimigrate_types::record::WorkItemRecord;

use crate::attachments::AttachmentTransfer;
use crate::config::types::{MigrationConfig, ProjectConfig};
use crate::crosswalk::{StateCrosswalk, TypeCrosswalk, TypeMapping};
use crate::error::MigrationError;
use crate::fields::{FieldCopier, FieldMap};
use crate::links::LinkResolver;
use crate::query::QueryFilter;
use crate::replay::{ReplayOutcome, StateTransitionReplay};
use crate::result::MigrationSummary;
use crate::retry::RetryPolicy;
use crate::service::{AttachmentStore, DestinationService, ProgressSink, SourceService};

/// Everything the engine talks to outside itself, borrowed for one run.
pub struct Collaborators<'a> {
    pub source: &'a dyn SourceService,
    pub destination: &'a mut dyn DestinationService,
    pub attachments: &'a mut dyn AttachmentStore,
    pub progress: &'a dyn ProgressSink,
}

/// Resolved, validated run parameters.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub source: ProjectConfig,
    pub destination: ProjectConfig,
    pub query: QueryFilter,
    pub attachments_dir: PathBuf,
    pub field_map: FieldMap,
    pub retry: RetryPolicy,
}

impl MigrationPlan {
    /// # Errors
    ///
    /// Returns an error if the configured field map is inconsistent.
    pub fn from_config(config: &MigrationConfig) -> anyhow::Result<Self> {
        let field_map = FieldMap::new(&config.field_map).context("Invalid field_map")?;
        Ok(Self {
            source: config.source.clone(),
            destination: config.destination.clone(),
            query: QueryFilter::new(config.source.project.clone(), &config.query),
            attachments_dir: config.attachments.dir.clone(),
            field_map,
            retry: config.retry.policy(),
        })
    }
}

pub struct MigrationEngine {
    plan: MigrationPlan,
    ledger: MigrationLedger,
    cancel: Option<Arc<AtomicBool>>,
}

impl MigrationEngine {
    #[must_use]
    pub fn new(plan: MigrationPlan, ledger: MigrationLedger) -> Self {
        Self {
            plan,
            ledger,
            cancel: None,
        }
    }

    /// Stop between records once `flag` is raised.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[must_use]
    pub fn plan(&self) -> &MigrationPlan {
        &self.plan
    }

    #[must_use]
    pub fn ledger(&self) -> &MigrationLedger {
        &self.ledger
    }

    #[must_use]
    pub fn into_ledger(self) -> MigrationLedger {
        self.ledger
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn stop(&self, processed: usize) -> Result<MigrationSummary, MigrationError> {
        self.ledger.persist()?;
        tracing::warn!(processed, "Migration cancelled");
        Err(MigrationError::Cancelled { processed })
    }

    /// Migrate every record the source query returns, then re-create links.
    ///
    /// Per-record and per-link failures are logged and counted in the
    /// summary. Only ledger I/O, the initial source query and the
    /// destination type listing end the run early.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] for the fatal conditions above and on
    /// cancellation.
    pub fn run(&mut self, c: Collaborators<'_>) -> Result<MigrationSummary, MigrationError> {
        let start = Instant::now();
        let span = tracing::info_span!(
            "migration",
            source = self.plan.source.project,
            destination = self.plan.destination.project
        );
        let _guard = span.enter();

        let Collaborators {
            source,
            destination,
            attachments,
            progress,
        } = c;

        let filter = self.plan.query.expression();
        let mut records = self
            .plan
            .retry
            .execute("QueryWorkItems", || source.query(&filter))
            .map_err(|source| MigrationError::Service {
                operation: "source query",
                source,
            })?;
        records.sort_by_key(|r| r.id);

        let destination_types = self
            .plan
            .retry
            .execute("GetWorkItemTypes", || destination.type_names())
            .map_err(|source| MigrationError::Service {
                operation: "destination type listing",
                source,
            })?;
        let states = StateCrosswalk::for_destination(&destination_types);

        tracing::info!(
            records = records.len(),
            already_migrated = self.ledger.len(),
            vocabulary = states.vocabulary().map(|v| v.to_string()).unwrap_or_default(),
            ledger = self.ledger.location(),
            "Starting migration"
        );

        let mut summary = MigrationSummary {
            records_seen: records.len(),
            ..MigrationSummary::default()
        };
        let total = records.len();
        for (i, record) in records.iter().enumerate() {
            if self.cancelled() {
                return self.stop(i);
            }
            self.migrate_record(
                destination,
                attachments,
                record,
                &destination_types,
                &states,
                &mut summary,
            )?;
            #[allow(clippy::cast_precision_loss)]
            progress.report((i + 1) as f64 / total as f64);
        }

        if self.cancelled() {
            return self.stop(total);
        }

        let mut resolver = LinkResolver::new(
            &self.ledger,
            &self.plan.retry,
            self.plan.source.uri_segment(),
            self.plan.destination.uri_segment(),
        );
        let internal = resolver.create_links(source, destination, &records);
        let external = resolver.create_external_links(destination, &records);
        summary.links_created = internal.created;
        summary.links_skipped = internal.skipped;
        summary.external_links_created = external.created;
        summary.external_links_dropped = external.skipped;

        summary.duration_secs = start.elapsed().as_secs_f64();
        tracing::info!(
            migrated = summary.migrated,
            already_migrated = summary.already_migrated,
            unmapped = summary.unmapped(),
            links = summary.links_created,
            duration_secs = summary.duration_secs,
            "Migration completed"
        );
        Ok(summary)
    }

    fn migrate_record(
        &mut self,
        destination: &mut dyn DestinationService,
        attachments: &mut dyn AttachmentStore,
        record: &WorkItemRecord,
        destination_types: &[String],
        states: &StateCrosswalk,
        summary: &mut MigrationSummary,
    ) -> Result<(), MigrationError> {
        if self.ledger.contains(record.id) {
            tracing::debug!(source_id = %record.id, "Already migrated");
            summary.already_migrated += 1;
            return Ok(());
        }

        let type_name = match TypeCrosswalk::resolve(&record.type_name, destination_types) {
            TypeMapping::Mapped(name) => name,
            TypeMapping::NoMapping => {
                tracing::info!(
                    source_id = %record.id,
                    work_item_type = record.type_name,
                    "Work item type does not exist in destination, skipped"
                );
                summary.skipped_no_mapping += 1;
                return Ok(());
            }
        };

        let retry = &self.plan.retry;
        let mut draft = match retry.execute(&format!("CreateWorkItem: {type_name}"), || {
            destination.create(&type_name)
        }) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::error!(source_id = %record.id, work_item_type = type_name, error = %e, "Cannot create work item");
                summary.failed_saves += 1;
                return Ok(());
            }
        };

        FieldCopier::new(
            &self.plan.source.project,
            &self.plan.destination.project,
            &self.plan.field_map,
        )
        .copy(record, &mut draft);

        let issues = destination.validate(&draft);
        if !issues.is_empty() {
            for issue in &issues {
                tracing::info!(
                    source_id = %record.id,
                    field = issue.field,
                    message = issue.message,
                    "Invalid field"
                );
            }
            tracing::error!(
                source_id = %record.id,
                work_item_type = record.type_name,
                "Work item could not be saved"
            );
            summary.skipped_invalid += 1;
            return Ok(());
        }

        let transfer = AttachmentTransfer::new(&self.plan.attachments_dir, retry);
        let downloaded = transfer.download(attachments, record);
        let uploaded = transfer.upload(attachments, record, &mut draft);
        summary.attachments_uploaded += uploaded.uploaded;
        summary.attachments_failed += downloaded.failed + uploaded.failed;

        let context = format!(
            "SaveWorkItem: {} {} {}",
            draft.type_name(),
            draft.state().unwrap_or_default(),
            draft.title()
        );
        let destination_id = match retry.execute(&context, || destination.save(&mut draft)) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(source_id = %record.id, error = %e, "Error saving work item");
                summary.failed_saves += 1;
                return Ok(());
            }
        };

        self.ledger.record(record.id, destination_id)?;
        self.ledger.persist()?;
        summary.migrated += 1;
        tracing::info!(
            source_id = %record.id,
            destination_id = %destination_id,
            work_item_type = draft.type_name(),
            "Work item migrated"
        );

        let replay = StateTransitionReplay::new(states, &self.plan.retry);
        match replay.replay(destination, record, &mut draft) {
            ReplayOutcome::Unchanged => {}
            ReplayOutcome::Direct { .. } => summary.replay_direct += 1,
            ReplayOutcome::Replayed { .. } => summary.replay_chained += 1,
            ReplayOutcome::Aborted { .. } => summary.replay_aborted += 1,
        }
        Ok(())
    }
}

impl std::fmt::Debug for MigrationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEngine")
            .field("plan", &self.plan)
            .field("ledger", &self.ledger)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}
