//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical customer rows (`Customer`, bincode-encoded).
pub const CUSTOMERS: TableDefinition<&str, &[u8]> = TableDefinition::new("customers");
/// Canonical job rows (`Job`, bincode-encoded).
pub const JOBS: TableDefinition<&str, &[u8]> = TableDefinition::new("jobs");

/// Customer name index ordered by (name_lower, id).
pub const CUSTOMERS_BY_NAME: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("customers_by_name");
/// Per-customer job index ordered by (customer_id, reverse-date-millis, id).
pub const JOBS_BY_CUSTOMER: TableDefinition<(&str, u64, &str), ()> =
    TableDefinition::new("jobs_by_customer");
