mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::crosswalk::VocabularyArg;

#[derive(Parser)]
#[command(
    name = "wimigrate",
    version,
    about = "Work-item migration between tracker projects with differing process templates"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a migration file and report the ledger it resumes from
    Check {
        /// Path to migration YAML file
        migration: PathBuf,
    },
    /// Print the source-to-destination id ledger of a migration
    Ledger {
        /// Path to migration YAML file
        migration: PathBuf,
        /// Emit JSON instead of the ledger's text table
        #[arg(long)]
        json: bool,
    },
    /// Preview type and state crosswalk decisions for a destination project
    Crosswalk {
        /// Work-item types declared by the destination (comma-separated)
        #[arg(long, value_delimiter = ',', required_unless_present = "template")]
        destination_types: Vec<String>,
        /// Use a standard template's type set instead of --destination-types
        #[arg(long, value_enum, conflicts_with = "destination_types")]
        template: Option<VocabularyArg>,
        /// Source work-item type to resolve
        #[arg(long)]
        source_type: String,
        /// Source state value to resolve
        #[arg(long)]
        state: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Check { migration } => commands::check::execute(&migration),
        Commands::Ledger { migration, json } => commands::ledger::execute(&migration, json),
        Commands::Crosswalk {
            destination_types,
            template,
            source_type,
            state,
        } => commands::crosswalk::execute(
            &destination_types,
            template,
            &source_type,
            state.as_deref(),
        ),
    }
}
