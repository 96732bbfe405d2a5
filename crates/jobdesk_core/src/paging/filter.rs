//! Filter set normalization.

use crate::gateway::Predicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterKind {
    Exact,
    Prefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterEntry {
    field: &'static str,
    value: String,
    kind: FilterKind,
    fold_case: bool,
}

/// Sparse set of user-entered field filters.
///
/// Absent or empty values mean "no constraint on this field"; values are
/// only ever prefix or equality predicates on text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-match filter on `field`.
    pub fn with_equals(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.entries.push(FilterEntry {
            field,
            value: value.into(),
            kind: FilterKind::Exact,
            fold_case: false,
        });
        self
    }

    /// Add a prefix filter on `field`.
    pub fn with_prefix(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.entries.push(FilterEntry {
            field,
            value: value.into(),
            kind: FilterKind::Prefix,
            fold_case: false,
        });
        self
    }

    /// Add a case-folded prefix filter, for fields backed by a derived
    /// lowercase copy.
    pub fn with_folded_prefix(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.entries.push(FilterEntry {
            field,
            value: value.into(),
            kind: FilterKind::Prefix,
            fold_case: true,
        });
        self
    }

    /// Whether every entry is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.value.trim().is_empty())
    }
}

/// Normalize a raw filter set into a canonical predicate list.
///
/// Values are trimmed, case-folded where the entry asks for it, and
/// all-empty-after-trim fields are dropped. Pure function; no errors.
pub fn normalize(filters: &FilterSet) -> Vec<Predicate> {
    filters
        .entries
        .iter()
        .filter_map(|entry| {
            let trimmed = entry.value.trim();
            if trimmed.is_empty() {
                return None;
            }
            let value = if entry.fold_case {
                trimmed.to_lowercase()
            } else {
                trimmed.to_string()
            };
            Some(match entry.kind {
                FilterKind::Exact => Predicate::equals(entry.field, value),
                FilterKind::Prefix => Predicate::starts_with(entry.field, value),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize, FilterSet};
    use crate::gateway::PredicateOp;

    #[test]
    fn normalize_trims_folds_and_drops_empty_fields() {
        let filters = FilterSet::new()
            .with_folded_prefix("name_lower", "  Jo  ")
            .with_prefix("post_code", "   ")
            .with_equals("customer_id", "cust-1");

        let predicates = normalize(&filters);
        assert_eq!(predicates.len(), 2);
        assert_eq!(predicates[0].field, "name_lower");
        assert_eq!(predicates[0].op, PredicateOp::StartsWith("jo".to_string()));
        assert_eq!(predicates[1].op, PredicateOp::Equals("cust-1".to_string()));
    }

    #[test]
    fn all_blank_filters_normalize_to_no_predicates() {
        let filters = FilterSet::new()
            .with_prefix("email", "")
            .with_prefix("phone", " \t ");
        assert!(filters.is_empty());
        assert!(normalize(&filters).is_empty());
    }

    #[test]
    fn unfolded_prefix_preserves_case() {
        let filters = FilterSet::new().with_prefix("post_code", " LS1 ");
        let predicates = normalize(&filters);
        assert_eq!(predicates[0].op, PredicateOp::StartsWith("LS1".to_string()));
    }
}
