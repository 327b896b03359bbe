//! Process-template vocabularies.

use serde::{Deserialize, Serialize};

/// Process template a destination project was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessVocabulary {
    Agile,
    Scrum,
    Cmmi,
}

impl ProcessVocabulary {
    /// Detection order: the first vocabulary whose required types are all
    /// present wins.
    pub const DETECTION_ORDER: [Self; 3] = [Self::Agile, Self::Scrum, Self::Cmmi];

    /// Standard work-item type names a project must declare to be classified
    /// under this vocabulary.
    #[must_use]
    pub fn required_types(self) -> &'static [&'static str] {
        match self {
            Self::Agile => &["User Story", "Bug", "Epic", "Feature", "Task", "Issue"],
            Self::Scrum => &[
                "Product Backlog Item",
                "Bug",
                "Epic",
                "Feature",
                "Task",
                "Impediment",
            ],
            Self::Cmmi => &[
                "Requirement",
                "Bug",
                "Epic",
                "Feature",
                "Task",
                "Issue",
                "Risk",
                "Review",
            ],
        }
    }

    /// Classify a project by its declared type names (case-insensitive).
    #[must_use]
    pub fn detect<S: AsRef<str>>(type_names: &[S]) -> Option<Self> {
        Self::DETECTION_ORDER.into_iter().find(|vocab| {
            vocab.required_types().iter().all(|required| {
                type_names
                    .iter()
                    .any(|name| name.as_ref().eq_ignore_ascii_case(required))
            })
        })
    }
}

impl std::fmt::Display for ProcessVocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Agile => "Agile",
            Self::Scrum => "Scrum",
            Self::Cmmi => "CMMI",
        })
    }
}
