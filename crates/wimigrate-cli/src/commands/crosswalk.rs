use anyhow::Result;
use clap::ValueEnum;
use wimigrate_engine::crosswalk::{StateCrosswalk, TypeCrosswalk, TypeMapping};
use wimigrate_types::vocabulary::ProcessVocabulary;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VocabularyArg {
    Agile,
    Scrum,
    Cmmi,
}

impl From<VocabularyArg> for ProcessVocabulary {
    fn from(arg: VocabularyArg) -> Self {
        match arg {
            VocabularyArg::Agile => ProcessVocabulary::Agile,
            VocabularyArg::Scrum => ProcessVocabulary::Scrum,
            VocabularyArg::Cmmi => ProcessVocabulary::Cmmi,
        }
    }
}

/// Execute the `crosswalk` command: show how a source type and state would
/// land in the given destination.
pub fn execute(
    destination_types: &[String],
    template: Option<VocabularyArg>,
    source_type: &str,
    state: Option<&str>,
) -> Result<()> {
    let declared: Vec<String> = match template {
        Some(t) => ProcessVocabulary::from(t)
            .required_types()
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        None => destination_types
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    };

    let states = StateCrosswalk::for_destination(&declared);
    let vocabulary = states
        .vocabulary()
        .map_or_else(|| "unclassified".to_string(), |v| v.to_string());
    println!("{:18} {vocabulary}", "Vocabulary:");

    let mapping = TypeCrosswalk::resolve(source_type, &declared);
    match &mapping {
        TypeMapping::Mapped(name) => println!("{:18} {source_type} -> {name}", "Type:"),
        TypeMapping::NoMapping => {
            println!("{:18} {source_type} -> (no mapping, record skipped)", "Type:");
        }
    }

    if let Some(state) = state {
        let destination_type = mapping.as_deref().unwrap_or(source_type);
        println!(
            "{:18} {state} -> {}",
            "State:",
            states.map(destination_type, state)
        );
    }
    Ok(())
}
