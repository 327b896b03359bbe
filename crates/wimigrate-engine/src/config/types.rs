use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    pub version: String,
    pub migration: String,
    pub source: ProjectConfig,
    pub destination: ProjectConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub attachments: AttachmentsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Source work-item type name -> field renames applied when the
    /// destination has no field of the same name.
    #[serde(default)]
    pub field_map: BTreeMap<String, Vec<FieldMapping>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub collection: String,
    pub project: String,
}

impl ProjectConfig {
    /// Project identifier as it appears inside artifact URIs.
    #[must_use]
    pub fn uri_segment(&self) -> String {
        let collection = self
            .collection
            .strip_prefix("tfs\\")
            .unwrap_or(&self.collection);
        format!("{collection}%2F{}", self.project)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    #[serde(default)]
    pub exclude_closed: bool,
    #[serde(default)]
    pub exclude_removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_dir")]
    pub dir: PathBuf,
}

fn default_ledger_dir() -> PathBuf {
    PathBuf::from("Map")
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            dir: default_ledger_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentsConfig {
    #[serde(default = "default_attachments_dir")]
    pub dir: PathBuf,
}

fn default_attachments_dir() -> PathBuf {
    PathBuf::from("Attachments")
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            dir: default_attachments_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMapping {
    pub source: String,
    pub destination: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_migration() {
        let yaml = r#"
version: "1.0"
migration: alpha_to_beta
source:
  collection: DefaultCollection
  project: Alpha
destination:
  collection: NewCollection
  project: Beta
"#;
        let config: MigrationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.migration, "alpha_to_beta");
        assert_eq!(config.source.project, "Alpha");
        // Defaults applied
        assert_eq!(config.ledger.dir, PathBuf::from("Map"));
        assert_eq!(config.attachments.dir, PathBuf::from("Attachments"));
        assert_eq!(config.retry.max_attempts, 100);
        assert_eq!(config.retry.base_delay_ms, 10);
        assert!(!config.query.exclude_closed);
        assert!(config.field_map.is_empty());
    }

    #[test]
    fn test_deserialize_full_migration() {
        let yaml = r#"
version: "1.0"
migration: alpha_to_beta
source: { collection: DefaultCollection, project: Alpha }
destination: { collection: NewCollection, project: Beta }
query: { exclude_closed: true, exclude_removed: true }
ledger: { dir: /var/lib/wimigrate/map }
attachments: { dir: /tmp/att }
retry: { max_attempts: 5, base_delay_ms: 250 }
field_map:
  Bug:
    - { source: "Repro Steps", destination: "Steps to Reproduce" }
"#;
        let config: MigrationConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.query.exclude_closed);
        assert_eq!(config.retry.policy().max_attempts(), 5);
        assert_eq!(config.retry.policy().backoff(1), Duration::from_millis(500));
        assert_eq!(config.field_map["Bug"][0].destination, "Steps to Reproduce");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let yaml = r#"
version: "1.0"
migration: m
source: { collection: C, project: A, server: x }
destination: { collection: C, project: B }
"#;
        assert!(serde_yaml::from_str::<MigrationConfig>(yaml).is_err());
    }

    #[test]
    fn test_uri_segment_drops_server_prefix() {
        let project = ProjectConfig {
            collection: "tfs\\DefaultCollection".into(),
            project: "Alpha".into(),
        };
        assert_eq!(project.uri_segment(), "DefaultCollection%2FAlpha");
    }
}
