//! Gateway port traits and query types.
//!
//! The gateway is the storage boundary of the listing layer: an ordered,
//! filterable record collection with cursor-relative pagination and
//! approximate counts. Adapters live in [`crate::db`] (embedded redb store)
//! and [`memory`] (in-memory store); both are constructed explicitly and
//! passed down so consumers and tests can substitute one for the other.

/// In-memory gateway adapter.
pub mod memory;

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Sortable field value extracted from a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderKey {
    Text(String),
    Time(DateTime<Utc>),
    Int(i64),
}

/// Direction of the active ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (smallest first).
    #[default]
    Ascending,
    /// Descending order (largest first).
    Descending,
}

/// Ordering applied to a collection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub direction: SortDirection,
}

impl OrderBy {
    pub const fn ascending(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub const fn descending(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

/// Position of a record within an ordered result set.
///
/// Anchors are value pairs rather than record references, so they remain
/// usable after the anchoring record is edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub key: OrderKey,
    pub id: String,
}

/// A field predicate evaluated by the gateway or by the client-side
/// filtering fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: &'static str,
    pub op: PredicateOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateOp {
    Equals(String),
    /// Prefix match. Gateways compile this to a range scan
    /// (`>= value` and `< value` + high sentinel), and support at most one
    /// such predicate per query.
    StartsWith(String),
}

impl Predicate {
    pub fn equals(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            op: PredicateOp::Equals(value.into()),
        }
    }

    pub fn starts_with(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            op: PredicateOp::StartsWith(value.into()),
        }
    }

    /// Whether this predicate needs a range scan on the gateway.
    pub fn is_range(&self) -> bool {
        matches!(self.op, PredicateOp::StartsWith(_))
    }

    /// Evaluate this predicate against a record.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let Some(text) = record.text_field(self.field) else {
            return false;
        };
        match &self.op {
            PredicateOp::Equals(value) => text.as_ref() == value.as_str(),
            PredicateOp::StartsWith(value) => text.as_ref().starts_with(value.as_str()),
        }
    }
}

/// A record stored in a gateway collection.
pub trait Record: Clone + Send + Sync + 'static {
    /// Partial-update payload applied over a stored record.
    type Update: Clone + Send + Sync;

    /// Collection name, used in diagnostics and logs.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// Text used when evaluating predicates against `field`.
    fn text_field(&self, field: &str) -> Option<Cow<'_, str>>;

    /// Sort key for `field`, or `None` when the field is not sortable.
    /// Fields used with [`OrderBy`] should be present on every record.
    fn order_key(&self, field: &str) -> Option<OrderKey>;

    fn apply_update(&mut self, update: &Self::Update);
}

/// One ordered, limited read against a collection.
#[derive(Debug, Clone)]
pub struct PageQuery {
    pub predicates: Vec<Predicate>,
    pub order: OrderBy,
    /// Maximum rows to return; `None` fetches the full result set.
    pub limit: Option<usize>,
    /// Resume strictly after this position in the active ordering.
    pub start_after: Option<Anchor>,
}

/// Async port for an ordered, filterable record collection.
///
/// Implementations support at most one range (prefix) predicate per query
/// and reject composite range queries with [`AppError::Query`]. Equality
/// predicates are unconstrained.
#[async_trait]
pub trait RecordGateway<R: Record>: Send + Sync {
    /// Run one ordered, limited, optionally cursor-anchored query.
    async fn query_page(&self, query: PageQuery) -> Result<Vec<R>, AppError>;

    /// Approximate number of records matching `predicates`.
    async fn approx_count(&self, predicates: &[Predicate]) -> Result<u64, AppError>;

    /// Insert a new record. Fails when the id already exists.
    async fn create(&self, record: &R) -> Result<(), AppError>;

    /// Fetch a record by id.
    async fn get(&self, id: &str) -> Result<Option<R>, AppError>;

    /// Apply a partial update. `Ok(None)` when the id is missing.
    async fn update(&self, id: &str, update: &R::Update) -> Result<Option<R>, AppError>;

    /// Delete a record by id. `false` when the id is missing.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

/// Total order used by every gateway implementation: the primary sort key
/// per the requested direction, then record id ascending as tie-break.
///
/// Records missing the sort key order after all keyed records.
pub fn compare_records<R: Record>(a: &R, b: &R, order: &OrderBy) -> Ordering {
    match (a.order_key(order.field), b.order_key(order.field)) {
        (Some(key_a), Some(key_b)) => {
            let primary = match order.direction {
                SortDirection::Ascending => key_a.cmp(&key_b),
                SortDirection::Descending => key_b.cmp(&key_a),
            };
            primary.then_with(|| a.id().cmp(b.id()))
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id().cmp(b.id()),
    }
}

/// Whether `record` sits strictly after `anchor` in the active ordering.
pub fn is_after_anchor<R: Record>(record: &R, anchor: &Anchor, order: &OrderBy) -> bool {
    let Some(key) = record.order_key(order.field) else {
        // Unkeyed records sort after every keyed position.
        return true;
    };
    let primary = match order.direction {
        SortDirection::Ascending => key.cmp(&anchor.key),
        SortDirection::Descending => anchor.key.cmp(&key),
    };
    match primary {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => record.id() > anchor.id.as_str(),
    }
}

/// Build the cursor anchor for `record` under `order`, when the record
/// carries the sort key.
pub fn anchor_for<R: Record>(record: &R, order: &OrderBy) -> Option<Anchor> {
    Some(Anchor {
        key: record.order_key(order.field)?,
        id: record.id().to_string(),
    })
}

/// Filter, order, anchor-skip, and limit an unsorted row set in memory.
///
/// Shared by gateway adapters as the evaluation path for orderings they
/// carry no index for.
pub(crate) fn page_from_scan<R: Record>(mut rows: Vec<R>, query: &PageQuery) -> Vec<R> {
    rows.retain(|record| query.predicates.iter().all(|p| p.matches(record)));
    rows.sort_by(|a, b| compare_records(a, b, &query.order));

    let rows: Vec<R> = match &query.start_after {
        Some(anchor) => rows
            .into_iter()
            .skip_while(|record| !is_after_anchor(record, anchor, &query.order))
            .collect(),
        None => rows,
    };
    match query.limit {
        Some(limit) => rows.into_iter().take(limit).collect(),
        None => rows,
    }
}

/// Reject queries carrying more than one range predicate.
///
/// Shared by gateway adapters; mirrors the composite-range restriction of
/// managed document stores so the planner's fallback boundary stays real.
pub(crate) fn reject_composite_range(predicates: &[Predicate]) -> Result<(), AppError> {
    let range_fields = predicates.iter().filter(|p| p.is_range()).count();
    if range_fields > 1 {
        return Err(AppError::Query(format!(
            "composite range filters are not supported ({range_fields} range predicates)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::{Customer, CreateCustomerRequest};

    fn customer(name: &str, id_hint: &str) -> Customer {
        let mut customer = Customer::new(CreateCustomerRequest {
            name: name.to_string(),
            email: format!("{id_hint}@example.com"),
            phone: String::new(),
            location: String::new(),
            billing_address: String::new(),
            post_code: String::new(),
        });
        customer.id = id_hint.to_string();
        customer
    }

    #[test]
    fn compare_records_breaks_ties_by_id_ascending() {
        let order = OrderBy::ascending("name_lower");
        let a = customer("Jo Smith", "a");
        let b = customer("Jo Smith", "b");
        assert_eq!(compare_records(&a, &b, &order), Ordering::Less);
        assert_eq!(compare_records(&b, &a, &order), Ordering::Greater);

        // Descending primary still tie-breaks by id ascending.
        let desc = OrderBy::descending("name_lower");
        assert_eq!(compare_records(&a, &b, &desc), Ordering::Less);
    }

    #[test]
    fn anchor_round_trip_positions_after_the_anchoring_record() {
        let order = OrderBy::ascending("name_lower");
        let first = customer("Alice", "a");
        let second = customer("Bob", "b");
        let anchor = anchor_for(&first, &order).expect("name key");
        assert!(!is_after_anchor(&first, &anchor, &order));
        assert!(is_after_anchor(&second, &anchor, &order));
    }

    #[test]
    fn prefix_predicates_count_as_range_filters() {
        let predicates = vec![
            Predicate::starts_with("name_lower", "jo"),
            Predicate::equals("post_code", "AB1"),
        ];
        assert!(reject_composite_range(&predicates).is_ok());

        let composite = vec![
            Predicate::starts_with("name_lower", "jo"),
            Predicate::starts_with("post_code", "AB1"),
        ];
        assert!(matches!(
            reject_composite_range(&composite),
            Err(AppError::Query(_))
        ));
    }
}
