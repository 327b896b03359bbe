//! Lifecycle state value resolution.

use wimigrate_types::vocabulary::ProcessVocabulary;

/// One row of a state table: any of `from` (case-insensitive) maps to `to`.
type StateRule = (&'static [&'static str], &'static str);

const AGILE_RULES: &[StateRule] = &[
    (&["To Do", "Proposed"], "New"),
    (&["Approved", "In Progress", "Committed"], "Active"),
    (&["Done"], "Closed"),
];

const SCRUM_RULES: &[StateRule] = &[
    (&["Proposed"], "New"),
    (&["Active"], "Approved"),
    (&["Resolved"], "Committed"),
    (&["Closed"], "Done"),
];

const CMMI_RULES: &[StateRule] = &[
    (&["To Do", "New"], "Proposed"),
    (&["Approved"], "Active"),
    (&["Committed"], "Resolved"),
    (&["Done"], "Closed"),
];

/// State translation bound to one destination project.
///
/// The destination's vocabulary is detected once from its declared type
/// names. An unclassified destination, or a state the matched table does not
/// cover, passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCrosswalk {
    vocabulary: Option<ProcessVocabulary>,
}

impl StateCrosswalk {
    #[must_use]
    pub fn for_destination<S: AsRef<str>>(destination_types: &[S]) -> Self {
        Self {
            vocabulary: ProcessVocabulary::detect(destination_types),
        }
    }

    #[must_use]
    pub fn vocabulary(&self) -> Option<ProcessVocabulary> {
        self.vocabulary
    }

    /// Destination state for `source_state` on a record of `destination_type`.
    #[must_use]
    pub fn map(&self, destination_type: &str, source_state: &str) -> String {
        let mapped = match self.vocabulary {
            Some(ProcessVocabulary::Agile) => {
                lookup(AGILE_RULES, source_state).or_else(|| {
                    (destination_type.eq_ignore_ascii_case("Bug")
                        && source_state.eq_ignore_ascii_case("Removed"))
                    .then_some("Closed")
                })
            }
            Some(ProcessVocabulary::Scrum) => lookup(SCRUM_RULES, source_state),
            Some(ProcessVocabulary::Cmmi) => lookup(CMMI_RULES, source_state),
            None => None,
        };
        mapped.unwrap_or(source_state).to_string()
    }

    /// One-shot form: detect the vocabulary and map a single state.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(
        destination_types: &[S],
        destination_type: &str,
        source_state: &str,
    ) -> String {
        Self::for_destination(destination_types).map(destination_type, source_state)
    }
}

fn lookup(rules: &[StateRule], state: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|(from, _)| from.iter().any(|f| f.eq_ignore_ascii_case(state)))
        .map(|(_, to)| *to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn crosswalk(vocab: ProcessVocabulary) -> StateCrosswalk {
        StateCrosswalk::for_destination(vocab.required_types())
    }

    #[rstest]
    #[case("User Story", "Proposed", "New")]
    #[case("User Story", "to do", "New")]
    #[case("Task", "Committed", "Active")]
    #[case("Task", "In Progress", "Active")]
    #[case("User Story", "Approved", "Active")]
    #[case("User Story", "Done", "Closed")]
    #[case("Bug", "Removed", "Closed")]
    #[case("bug", "REMOVED", "Closed")]
    #[case("User Story", "Removed", "Removed")]
    #[case("User Story", "Resolved", "Resolved")]
    fn agile_table(#[case] ty: &str, #[case] state: &str, #[case] expected: &str) {
        assert_eq!(crosswalk(ProcessVocabulary::Agile).map(ty, state), expected);
    }

    #[rstest]
    #[case("Proposed", "New")]
    #[case("Active", "Approved")]
    #[case("Resolved", "Committed")]
    #[case("Closed", "Done")]
    #[case("Removed", "Removed")]
    fn scrum_table(#[case] state: &str, #[case] expected: &str) {
        assert_eq!(
            crosswalk(ProcessVocabulary::Scrum).map("Product Backlog Item", state),
            expected
        );
    }

    #[rstest]
    #[case("To Do", "Proposed")]
    #[case("New", "Proposed")]
    #[case("Approved", "Active")]
    #[case("Committed", "Resolved")]
    #[case("Done", "Closed")]
    #[case("Closed", "Closed")]
    fn cmmi_table(#[case] state: &str, #[case] expected: &str) {
        assert_eq!(crosswalk(ProcessVocabulary::Cmmi).map("Requirement", state), expected);
    }

    #[test]
    fn unclassified_destination_passes_through() {
        let cw = StateCrosswalk::for_destination(&["Bug", "Task"]);
        assert_eq!(cw.vocabulary(), None);
        assert_eq!(cw.map("Bug", "Done"), "Done");
        assert_eq!(cw.map("Bug", "Removed"), "Removed");
    }

    #[test]
    fn only_the_first_matching_vocabulary_applies() {
        // Declares everything Agile and CMMI require; Agile is tested first.
        let mut declared: Vec<&str> = ProcessVocabulary::Agile.required_types().to_vec();
        declared.extend_from_slice(ProcessVocabulary::Cmmi.required_types());
        let cw = StateCrosswalk::for_destination(&declared);
        assert_eq!(cw.vocabulary(), Some(ProcessVocabulary::Agile));
        // CMMI would map "New" to "Proposed"; Agile leaves it alone.
        assert_eq!(cw.map("Requirement", "New"), "New");
    }

    #[test]
    fn resolve_matches_bound_form() {
        let declared = ProcessVocabulary::Cmmi.required_types();
        assert_eq!(StateCrosswalk::resolve(declared, "Bug", "Approved"), "Active");
    }
}
