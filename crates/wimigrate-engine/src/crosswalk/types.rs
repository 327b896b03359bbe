//! Work-item type name resolution.

/// Equivalent requirement-style types across the three templates, in
/// preference order.
const PRODUCT_PLANNING: [&str; 3] = ["User Story", "Product Backlog Item", "Requirement"];

/// Equivalent issue/risk-style types across the three templates, in
/// preference order.
const RISK_MANAGEMENT: [&str; 4] = ["Issue", "Impediment", "Risk", "Review"];

const SYNONYM_BUCKETS: [&[&str]; 2] = [&PRODUCT_PLANNING, &RISK_MANAGEMENT];

/// Result of a type lookup.
///
/// `NoMapping` is an ordinary outcome, not an error: the record is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMapping {
    /// Destination type name, spelled as the destination declares it.
    Mapped(String),
    NoMapping,
}

impl TypeMapping {
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Mapped(name) => Some(name),
            Self::NoMapping => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCrosswalk;

impl TypeCrosswalk {
    /// Pick the destination type for `source_type`.
    ///
    /// A case-insensitive exact match wins. Otherwise, if the source type is
    /// in a synonym bucket, the first bucket member the destination declares
    /// is used.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(source_type: &str, destination_types: &[S]) -> TypeMapping {
        let source_type = source_type.trim();
        if source_type.is_empty() {
            return TypeMapping::NoMapping;
        }

        if let Some(found) = find_declared(destination_types, source_type) {
            return TypeMapping::Mapped(found.to_string());
        }

        SYNONYM_BUCKETS
            .iter()
            .find(|bucket| bucket.iter().any(|t| t.eq_ignore_ascii_case(source_type)))
            .and_then(|bucket| {
                bucket
                    .iter()
                    .find_map(|candidate| find_declared(destination_types, candidate))
            })
            .map_or(TypeMapping::NoMapping, |found| {
                TypeMapping::Mapped(found.to_string())
            })
    }
}

fn find_declared<'a, S: AsRef<str>>(declared: &'a [S], name: &str) -> Option<&'a str> {
    declared
        .iter()
        .map(AsRef::as_ref)
        .find(|d| d.eq_ignore_ascii_case(name))
}
