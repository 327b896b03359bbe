//! Driving a saved destination record to the source record's current state.
//!
//! A direct transition to the crosswalked terminal state is tried first.
//! Workflows that reject the jump get the source's revision trail replayed
//! one transition at a time, each step validated and saved on its own. The
//! first failing step ends the chain and the record stays at the last state
//! that was committed.

use wimigrate_types::draft::{FieldIssue, WorkItemDraft};
use wimigrate_types::field::{REASON_FIELD, STATE_FIELD};
use wimigrate_types::record::WorkItemRecord;

use crate::crosswalk::StateCrosswalk;
use crate::retry::RetryPolicy;
use crate::service::DestinationService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// The record already sits in the terminal state, or the source has none.
    Unchanged,
    /// The terminal state was reached in a single transition.
    Direct { state: String },
    /// The revision trail was replayed; `steps` transitions were saved.
    Replayed { state: String, steps: usize },
    /// A step was rejected or could not be saved. The record keeps
    /// `committed_state`.
    Aborted {
        committed_state: Option<String>,
        failed_state: String,
        steps: usize,
    },
}

pub struct StateTransitionReplay<'a> {
    crosswalk: &'a StateCrosswalk,
    retry: &'a RetryPolicy,
}

enum Step {
    Committed,
    Rejected(Vec<FieldIssue>),
    SaveFailed,
}

impl<'a> StateTransitionReplay<'a> {
    #[must_use]
    pub fn new(crosswalk: &'a StateCrosswalk, retry: &'a RetryPolicy) -> Self {
        Self { crosswalk, retry }
    }

    /// Bring `draft`, a saved counterpart of `source`, to the source's state.
    pub fn replay(
        &self,
        destination: &mut dyn DestinationService,
        source: &WorkItemRecord,
        draft: &mut WorkItemDraft,
    ) -> ReplayOutcome {
        let Some(source_state) = source.state() else {
            return ReplayOutcome::Unchanged;
        };
        let target = self.crosswalk.map(draft.type_name(), source_state);
        if draft.state() == Some(target.as_str()) {
            return ReplayOutcome::Unchanged;
        }

        match self.attempt(destination, source, draft, &target, None) {
            Step::Committed => {
                tracing::debug!(source_id = %source.id, state = target, "Direct state transition");
                return ReplayOutcome::Direct { state: target };
            }
            Step::Rejected(issues) => {
                tracing::debug!(
                    source_id = %source.id,
                    state = target,
                    issues = issues.len(),
                    "Direct transition rejected, replaying history"
                );
            }
            Step::SaveFailed => {
                return ReplayOutcome::Aborted {
                    committed_state: draft.state().map(str::to_string),
                    failed_state: target,
                    steps: 0,
                };
            }
        }

        let chain = self.chain(draft.type_name(), source);
        let reason = source.reason();
        let Some((last, intermediate)) = chain.split_last() else {
            return ReplayOutcome::Aborted {
                committed_state: draft.state().map(str::to_string),
                failed_state: target,
                steps: 0,
            };
        };

        let mut steps = 0;
        for next in intermediate {
            if draft.state() == Some(next.as_str()) {
                continue;
            }
            if let Some(outcome) = self.step(destination, source, draft, next, None, steps) {
                return outcome;
            }
            steps += 1;
        }
        if let Some(outcome) = self.step(destination, source, draft, last, reason, steps) {
            return outcome;
        }
        steps += 1;

        tracing::info!(source_id = %source.id, state = last.as_str(), steps, "State history replayed");
        ReplayOutcome::Replayed {
            state: last.clone(),
            steps,
        }
    }

    /// Destination-vocabulary transition targets: every state of the
    /// deduplicated trail, crosswalked, with repeats that the crosswalk
    /// introduces collapsed again. Steps equal to the draft's current state
    /// are skipped by the caller.
    fn chain(&self, destination_type: &str, source: &WorkItemRecord) -> Vec<String> {
        let mut mapped: Vec<String> = Vec::new();
        for state in source.state_history() {
            let value = self.crosswalk.map(destination_type, state);
            if mapped.last() != Some(&value) {
                mapped.push(value);
            }
        }
        mapped
    }

    fn step(
        &self,
        destination: &mut dyn DestinationService,
        source: &WorkItemRecord,
        draft: &mut WorkItemDraft,
        next: &str,
        reason: Option<&str>,
        steps: usize,
    ) -> Option<ReplayOutcome> {
        match self.attempt(destination, source, draft, next, reason) {
            Step::Committed => None,
            Step::Rejected(issues) => {
                for issue in &issues {
                    tracing::info!(
                        source_id = %source.id,
                        field = issue.field,
                        message = issue.message,
                        state = next,
                        "Transition rejected"
                    );
                }
                Some(self.aborted(source, draft, next, steps))
            }
            Step::SaveFailed => Some(self.aborted(source, draft, next, steps)),
        }
    }

    fn aborted(
        &self,
        source: &WorkItemRecord,
        draft: &WorkItemDraft,
        failed_state: &str,
        steps: usize,
    ) -> ReplayOutcome {
        let committed_state = draft.state().map(str::to_string);
        tracing::warn!(
            source_id = %source.id,
            committed_state = committed_state.as_deref().unwrap_or_default(),
            failed_state,
            steps,
            "State replay aborted"
        );
        ReplayOutcome::Aborted {
            committed_state,
            failed_state: failed_state.to_string(),
            steps,
        }
    }

    /// Set, validate and save one transition. On anything but success the
    /// draft is restored to the last committed values.
    fn attempt(
        &self,
        destination: &mut dyn DestinationService,
        source: &WorkItemRecord,
        draft: &mut WorkItemDraft,
        state: &str,
        reason: Option<&str>,
    ) -> Step {
        let committed = draft.clone();

        if let Err(e) = draft.set_field(STATE_FIELD, state) {
            *draft = committed;
            return Step::Rejected(vec![FieldIssue::new(STATE_FIELD, e.to_string())]);
        }
        if let Some(reason) = reason {
            if let Err(e) = draft.set_field(REASON_FIELD, reason) {
                tracing::debug!(source_id = %source.id, error = %e, "Reason not carried over");
            }
        }

        let issues: Vec<FieldIssue> = destination
            .validate(draft)
            .into_iter()
            .filter(|i| i.field == STATE_FIELD || i.field == REASON_FIELD)
            .collect();
        if !issues.is_empty() {
            *draft = committed;
            return Step::Rejected(issues);
        }

        let context = format!("SaveWorkItem: {} {} {}", draft.type_name(), state, draft.title());
        match self.retry.execute(&context, || destination.save(draft)) {
            Ok(_) => Step::Committed,
            Err(e) => {
                tracing::error!(source_id = %source.id, state, error = %e, "Error saving state transition");
                *draft = committed;
                Step::SaveFailed
            }
        }
    }
}
