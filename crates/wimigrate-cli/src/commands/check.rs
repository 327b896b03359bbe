use std::path::Path;

use anyhow::Result;
use wimigrate_engine::MigrationPlan;

/// Execute the `check` command: validate the migration file and report the
/// ledger a run would resume from.
pub fn execute(migration_path: &Path) -> Result<()> {
    let config = super::load_config(migration_path)?;
    println!("Migration structure: OK");

    let plan = MigrationPlan::from_config(&config)?;
    println!(
        "{:18} {}/{}",
        "Source:", plan.source.collection, plan.source.project
    );
    println!(
        "{:18} {}/{}",
        "Destination:", plan.destination.collection, plan.destination.project
    );
    println!("{:18} {}", "Query:", plan.query.expression());
    println!(
        "{:18} {} attempt(s), {}ms base delay",
        "Retry:",
        plan.retry.max_attempts(),
        plan.retry.backoff(0).as_millis()
    );

    let ledger = super::open_ledger(&config)?;
    println!(
        "{:18} {} ({} record(s) already migrated)",
        "Ledger:",
        ledger.location(),
        ledger.len()
    );
    tracing::debug!(ledger = ?ledger, "Ledger opened");

    println!("\nAll checks passed.");
    Ok(())
}
