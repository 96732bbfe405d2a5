//! Customer storage operations backed by redb.

use crate::db::tables::*;
use crate::error::AppError;
use crate::gateway::{
    page_from_scan, reject_composite_range, Anchor, OrderKey, PageQuery, Predicate, PredicateOp,
    Record, RecordGateway, SortDirection,
};
use crate::models::customer::{Customer, UpdateCustomerRequest};
use async_trait::async_trait;
use redb::{ReadableDatabase, ReadableTable};
use std::cmp::Ordering;
use std::sync::Arc;

/// Accessor for customer-related redb tables.
#[derive(Clone)]
pub struct CustomerStore {
    db: Arc<redb::Database>,
}

impl CustomerStore {
    /// Initialize customer tables if they do not exist yet.
    ///
    /// # Returns
    /// A new [`CustomerStore`] accessor bound to `db`.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(CUSTOMERS)?;
        write_txn.open_table(CUSTOMERS_BY_NAME)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new customer row and its name index row atomically.
    ///
    /// # Errors
    /// Returns an error when serialization fails, the id already exists, or
    /// storage operations fail.
    pub fn create(&self, customer: &Customer) -> Result<(), AppError> {
        let encoded = bincode::serialize(customer)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut customers = write_txn.open_table(CUSTOMERS)?;
            let mut by_name = write_txn.open_table(CUSTOMERS_BY_NAME)?;

            if customers.get(customer.id.as_str())?.is_some() {
                return Err(AppError::Write(format!(
                    "customer id '{}' already exists",
                    customer.id
                )));
            }

            customers.insert(customer.id.as_str(), encoded.as_slice())?;
            by_name.insert((customer.name_lower.as_str(), customer.id.as_str()), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a customer by id.
    ///
    /// # Returns
    /// `Ok(Some(customer))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<Customer>, AppError> {
        let read_txn = self.db.begin_read()?;
        let customers = read_txn.open_table(CUSTOMERS)?;
        match customers.get(id)? {
            Some(value) => Ok(Some(deserialize_customer(value.value())?)),
            None => Ok(None),
        }
    }

    /// Apply a partial update, re-keying the name index when the name
    /// changed.
    ///
    /// # Returns
    /// `Ok(Some(customer))` when updated, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn update(
        &self,
        id: &str,
        update: &UpdateCustomerRequest,
    ) -> Result<Option<Customer>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut customers = write_txn.open_table(CUSTOMERS)?;
            let mut by_name = write_txn.open_table(CUSTOMERS_BY_NAME)?;

            let Some(old_guard) = customers.get(id)? else {
                return Ok(None);
            };
            let mut customer = deserialize_customer(old_guard.value())?;
            drop(old_guard);

            let old_name_key = customer.name_lower.clone();
            customer.apply_update(update);
            let encoded = bincode::serialize(&customer)?;

            customers.insert(id, encoded.as_slice())?;
            if old_name_key != customer.name_lower {
                let _ = by_name.remove((old_name_key.as_str(), id))?;
            }
            by_name.insert((customer.name_lower.as_str(), id), ())?;
            Some(customer)
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a customer by id.
    ///
    /// Jobs referencing the customer are left in place; use
    /// [`crate::db::Database::delete_customer_with_jobs`] for the cascading
    /// form.
    ///
    /// # Returns
    /// `true` when a row was deleted, otherwise `false`.
    ///
    /// # Errors
    /// Returns an error when storage or deserialization fails.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut customers = write_txn.open_table(CUSTOMERS)?;
            let mut by_name = write_txn.open_table(CUSTOMERS_BY_NAME)?;

            let Some(old_guard) = customers.get(id)? else {
                return Ok(false);
            };
            let customer = deserialize_customer(old_guard.value())?;
            drop(old_guard);

            let _ = by_name.remove((customer.name_lower.as_str(), id))?;
            let _ = customers.remove(id)?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    fn count_matching(&self, predicates: &[Predicate]) -> Result<u64, AppError> {
        let read_txn = self.db.begin_read()?;
        let customers = read_txn.open_table(CUSTOMERS)?;
        let mut count = 0u64;
        for item in customers.iter()? {
            let (_, value) = item?;
            let customer = deserialize_customer(value.value())?;
            if predicates.iter().all(|p| p.matches(&customer)) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Serve an ordered page from the `(name_lower, id)` index.
    ///
    /// A prefix predicate on `name_lower` becomes the index range; all other
    /// predicates are applied to the canonical row during iteration.
    fn indexed_query(&self, query: &PageQuery) -> Result<Vec<Customer>, AppError> {
        let name_prefix = query.predicates.iter().find_map(|p| {
            if p.field != "name_lower" {
                return None;
            }
            match &p.op {
                PredicateOp::StartsWith(value) => Some(value.clone()),
                PredicateOp::Equals(_) => None,
            }
        });
        let residual: Vec<&Predicate> = query
            .predicates
            .iter()
            .filter(|p| !(p.field == "name_lower" && p.is_range()))
            .collect();

        let read_txn = self.db.begin_read()?;
        let by_name = read_txn.open_table(CUSTOMERS_BY_NAME)?;
        let customers = read_txn.open_table(CUSTOMERS)?;

        let limit = query.limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        for item in by_name.iter()? {
            let (key, _) = item?;
            let (name_key, id) = key.value();
            if let Some(prefix) = &name_prefix {
                if name_key < prefix.as_str() {
                    continue;
                }
                if !name_key.starts_with(prefix.as_str()) {
                    break;
                }
            }
            if let Some(anchor) = &query.start_after {
                if !after_name_anchor(name_key, id, anchor) {
                    continue;
                }
            }
            let Some(guard) = customers.get(id)? else {
                continue;
            };
            let customer = deserialize_customer(guard.value())?;
            if !residual.iter().all(|p| p.matches(&customer)) {
                continue;
            }
            out.push(customer);
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }

    fn scan_query(&self, query: &PageQuery) -> Result<Vec<Customer>, AppError> {
        let read_txn = self.db.begin_read()?;
        let customers = read_txn.open_table(CUSTOMERS)?;
        let mut rows = Vec::new();
        for item in customers.iter()? {
            let (_, value) = item?;
            rows.push(deserialize_customer(value.value())?);
        }
        Ok(page_from_scan(rows, query))
    }
}

fn after_name_anchor(name_key: &str, id: &str, anchor: &Anchor) -> bool {
    let OrderKey::Text(anchor_key) = &anchor.key else {
        return true;
    };
    match name_key.cmp(anchor_key.as_str()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => id > anchor.id.as_str(),
    }
}

pub(crate) fn deserialize_customer(bytes: &[u8]) -> Result<Customer, bincode::Error> {
    bincode::deserialize(bytes)
}

#[async_trait]
impl RecordGateway<Customer> for CustomerStore {
    async fn query_page(&self, query: PageQuery) -> Result<Vec<Customer>, AppError> {
        reject_composite_range(&query.predicates)?;
        if query.order.field == "name_lower" && query.order.direction == SortDirection::Ascending {
            self.indexed_query(&query)
        } else {
            self.scan_query(&query)
        }
    }

    async fn approx_count(&self, predicates: &[Predicate]) -> Result<u64, AppError> {
        reject_composite_range(predicates)?;
        self.count_matching(predicates)
    }

    async fn create(&self, record: &Customer) -> Result<(), AppError> {
        CustomerStore::create(self, record)
    }

    async fn get(&self, id: &str) -> Result<Option<Customer>, AppError> {
        CustomerStore::get(self, id)
    }

    async fn update(
        &self,
        id: &str,
        update: &UpdateCustomerRequest,
    ) -> Result<Option<Customer>, AppError> {
        CustomerStore::update(self, id, update)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        CustomerStore::delete(self, id)
    }
}
