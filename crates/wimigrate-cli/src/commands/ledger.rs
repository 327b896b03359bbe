use std::path::Path;

use anyhow::Result;
use wimigrate_ledger::format;

/// Execute the `ledger` command: print the id mapping of a migration.
pub fn execute(migration_path: &Path, json: bool) -> Result<()> {
    let config = super::load_config(migration_path)?;
    let ledger = super::open_ledger(&config)?;

    if json {
        let entries: Vec<serde_json::Value> = ledger
            .entries()
            .iter()
            .map(|(source, destination)| {
                serde_json::json!({ "source": source.get(), "destination": destination.get() })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format::render(ledger.entries()));
    }
    Ok(())
}
