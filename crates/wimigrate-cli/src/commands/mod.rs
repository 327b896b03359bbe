pub mod check;
pub mod crosswalk;
pub mod ledger;

use std::path::Path;

use anyhow::{Context, Result};
use wimigrate_engine::config::{parse_migration, validate_migration, MigrationConfig};
use wimigrate_ledger::{FileLedger, MigrationLedger};

/// Parse and validate a migration file.
pub(crate) fn load_config(path: &Path) -> Result<MigrationConfig> {
    let config = parse_migration(path)
        .with_context(|| format!("Failed to parse migration: {}", path.display()))?;
    validate_migration(&config)?;
    Ok(config)
}

/// The file ledger a migration reads and writes.
pub(crate) fn ledger_backend(config: &MigrationConfig) -> FileLedger {
    FileLedger::for_projects(
        &config.ledger.dir,
        &config.source.project,
        &config.destination.project,
    )
}

pub(crate) fn open_ledger(config: &MigrationConfig) -> Result<MigrationLedger> {
    let backend = ledger_backend(config);
    let location = backend.path().display().to_string();
    MigrationLedger::open(Box::new(backend))
        .with_context(|| format!("Failed to open ledger: {location}"))
}
