//! Storage integration tests.

use super::Database;
use crate::test_support::{sample_fleet, setup_temp_db};
use tempfile::TempDir;


fn seeded_db(count: usize) -> (Database, TempDir) {
    let (db, temp_dir) = setup_temp_db();
    for customer in sample_fleet(count) {
        db.customers.create(&customer).expect("create customer");
    }
    (db, temp_dir)
}
