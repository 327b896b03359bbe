//! Semantic validation for parsed migration configuration values.

use std::collections::HashSet;

use anyhow::{bail, Result};

use crate::config::types::{MigrationConfig, ProjectConfig};

fn validate_project(project: &ProjectConfig, context: &str, errors: &mut Vec<String>) {
    if project.collection.trim().is_empty() {
        errors.push(format!("{context}: collection must not be empty"));
    }
    if project.project.trim().is_empty() {
        errors.push(format!("{context}: project must not be empty"));
    }
}

/// Validate a parsed migration configuration.
/// Returns `Ok(())` if valid, Err with all validation errors if not.
///
/// # Errors
///
/// Returns an error listing all validation failures found in the config.
pub fn validate_migration(config: &MigrationConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(format!(
            "Unsupported migration version '{}', expected '1.0'",
            config.version
        ));
    }

    if config.migration.trim().is_empty() {
        errors.push("Migration name must not be empty".to_string());
    }

    validate_project(&config.source, "source", &mut errors);
    validate_project(&config.destination, "destination", &mut errors);

    if config.source.collection.eq_ignore_ascii_case(&config.destination.collection)
        && config.source.project.eq_ignore_ascii_case(&config.destination.project)
    {
        errors.push("Source and destination must be different projects".to_string());
    }

    if config.ledger.dir.as_os_str().is_empty() {
        errors.push("ledger.dir must not be empty".to_string());
    }
    if config.attachments.dir.as_os_str().is_empty() {
        errors.push("attachments.dir must not be empty".to_string());
    }

    if config.retry.max_attempts == 0 {
        errors.push("retry.max_attempts must be at least 1".to_string());
    }

    for (type_name, mappings) in &config.field_map {
        if type_name.trim().is_empty() {
            errors.push("field_map has an entry with an empty work item type".to_string());
        }
        let mut seen = HashSet::new();
        for (i, mapping) in mappings.iter().enumerate() {
            if mapping.source.trim().is_empty() || mapping.destination.trim().is_empty() {
                errors.push(format!("field_map.{type_name}[{i}] has an empty field name"));
            } else if !seen.insert(mapping.source.as_str()) {
                errors.push(format!(
                    "field_map.{type_name} maps source field '{}' more than once",
                    mapping.source
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        bail!("Migration validation failed:\n  - {}", errors.join("\n  - "));
    }
}
