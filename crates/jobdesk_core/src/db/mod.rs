//! Embedded storage adapters backed by redb.

/// Customer storage helpers.
pub mod customer;
/// Job storage helpers.
pub mod job;
/// Table definitions.
pub mod tables;

#[cfg(test)]
mod tests;

use crate::error::AppError;
use redb::ReadableTable;
use std::sync::Arc;

/// Database handle with per-collection store accessors.
///
/// Constructed explicitly and passed down to consumers; there is no
/// process-wide handle.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub customers: customer::CustomerStore,
    pub jobs: job::JobStore,
}

impl Database {
    /// Open the database and initialize tables.
    ///
    /// # Arguments
    /// - `path`: Directory that holds the database file.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if redb cannot open the database or tables.
    pub fn new(path: &str) -> Result<Self, AppError> {
        std::fs::create_dir_all(path).ok();
        let file = std::path::Path::new(path).join(tables::REDB_FILE_NAME);
        let db = Arc::new(redb::Database::create(file)?);
        tracing::debug!(path, "opened jobdesk database");
        Self::from_shared(db)
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Returns
    /// A new [`Database`] wrapper that shares the underlying redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be initialized.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            customers: customer::CustomerStore::new(db.clone())?,
            jobs: job::JobStore::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }

    /// Delete a customer together with every job that references it, in one
    /// write transaction.
    ///
    /// # Returns
    /// `Ok(true)` when the customer existed, `Ok(false)` otherwise.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete_customer_with_jobs(&self, customer_id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut customers = write_txn.open_table(tables::CUSTOMERS)?;
            let mut by_name = write_txn.open_table(tables::CUSTOMERS_BY_NAME)?;
            let mut jobs = write_txn.open_table(tables::JOBS)?;
            let mut by_customer = write_txn.open_table(tables::JOBS_BY_CUSTOMER)?;

            let Some(guard) = customers.get(customer_id)? else {
                return Ok(false);
            };
            let customer = customer::deserialize_customer(guard.value())?;
            drop(guard);

            let mut job_keys: Vec<(u64, String)> = Vec::new();
            for item in by_customer.iter()? {
                let (key, _) = item?;
                let (owner, recency_key, job_id) = key.value();
                if owner == customer_id {
                    job_keys.push((recency_key, job_id.to_string()));
                }
            }
            for (recency_key, job_id) in &job_keys {
                let _ = by_customer.remove((customer_id, *recency_key, job_id.as_str()))?;
                let _ = jobs.remove(job_id.as_str())?;
            }

            let _ = by_name.remove((customer.name_lower.as_str(), customer_id))?;
            let _ = customers.remove(customer_id)?;
        }
        write_txn.commit()?;
        Ok(true)
    }
}
