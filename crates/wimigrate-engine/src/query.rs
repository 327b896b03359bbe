//! Source query expression.

use crate::config::types::QueryConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub project: String,
    pub exclude_closed: bool,
    pub exclude_removed: bool,
}

impl QueryFilter {
    #[must_use]
    pub fn new(project: impl Into<String>, query: &QueryConfig) -> Self {
        Self {
            project: project.into(),
            exclude_closed: query.exclude_closed,
            exclude_removed: query.exclude_removed,
        }
    }

    /// Filter expression selecting the project's work items in ascending id
    /// order, which the link pass relies on.
    #[must_use]
    pub fn expression(&self) -> String {
        let mut expr = format!(
            "SELECT * FROM WorkItems WHERE [System.TeamProject] = '{}'",
            self.project.replace('\'', "''")
        );
        if self.exclude_closed {
            expr.push_str(" AND [System.State] <> 'Closed'");
        }
        if self.exclude_removed {
            expr.push_str(" AND [System.State] <> 'Removed'");
        }
        expr.push_str(" ORDER BY [System.Id]");
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_project_query() {
        let filter = QueryFilter::new("Alpha", &QueryConfig::default());
        assert_eq!(
            filter.expression(),
            "SELECT * FROM WorkItems WHERE [System.TeamProject] = 'Alpha' ORDER BY [System.Id]"
        );
    }

    #[test]
    fn exclusions_and_quoting() {
        let filter = QueryFilter::new(
            "Bob's Team",
            &QueryConfig {
                exclude_closed: true,
                exclude_removed: true,
            },
        );
        let expr = filter.expression();
        assert!(expr.contains("= 'Bob''s Team'"));
        assert!(expr.contains("<> 'Closed' AND [System.State] <> 'Removed' ORDER BY"));
    }
}
