//! Work-item identifier newtype.

use serde::{Deserialize, Serialize};

/// Service-assigned work-item identifier.
///
/// Identifiers are scoped to one tracking-service instance: a source id and a
/// destination id with the same number are unrelated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(u32);

impl WorkItemId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkItemId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for WorkItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_surrounding_whitespace() {
        let id: WorkItemId = "\t 42 \t".parse().unwrap();
        assert_eq!(id, WorkItemId::new(42));
    }

    #[test]
    fn rejects_negative_and_empty() {
        assert!("-3".parse::<WorkItemId>().is_err());
        assert!("".parse::<WorkItemId>().is_err());
    }

    #[test]
    fn orders_numerically() {
        assert!(WorkItemId::new(9) < WorkItemId::new(10));
    }
}
