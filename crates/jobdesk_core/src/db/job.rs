//! Job storage operations backed by redb.

use crate::db::tables::*;
use crate::error::AppError;
use crate::gateway::{
    page_from_scan, reject_composite_range, Anchor, OrderKey, PageQuery, Predicate, PredicateOp,
    Record, RecordGateway, SortDirection,
};
use crate::models::job::{Job, UpdateJobRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::cmp::Ordering;
use std::sync::Arc;

/// Accessor for job-related redb tables.
#[derive(Clone)]
pub struct JobStore {
    db: Arc<redb::Database>,
}

/// Index key component ordering jobs most-recent-first.
///
/// Pre-epoch dates are clamped to preserve total ordering semantics for
/// expected runtime data while avoiding negative->u64 underflow.
pub(crate) fn reverse_date_key(date: DateTime<Utc>) -> u64 {
    let millis = date.timestamp_millis().max(0) as u64;
    u64::MAX.saturating_sub(millis)
}

impl JobStore {
    /// Initialize job tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(JOBS)?;
        write_txn.open_table(JOBS_BY_CUSTOMER)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new job row and its per-customer index row atomically.
    ///
    /// # Errors
    /// Returns an error when serialization fails, the id already exists, or
    /// storage operations fail.
    pub fn create(&self, job: &Job) -> Result<(), AppError> {
        let encoded = bincode::serialize(job)?;
        let recency_key = reverse_date_key(job.date);
        let write_txn = self.db.begin_write()?;
        {
            let mut jobs = write_txn.open_table(JOBS)?;
            let mut by_customer = write_txn.open_table(JOBS_BY_CUSTOMER)?;

            if jobs.get(job.id.as_str())?.is_some() {
                return Err(AppError::Write(format!("job id '{}' already exists", job.id)));
            }

            jobs.insert(job.id.as_str(), encoded.as_slice())?;
            by_customer.insert((job.customer_id.as_str(), recency_key, job.id.as_str()), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a job by id.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<Job>, AppError> {
        let read_txn = self.db.begin_read()?;
        let jobs = read_txn.open_table(JOBS)?;
        match jobs.get(id)? {
            Some(value) => Ok(Some(deserialize_job(value.value())?)),
            None => Ok(None),
        }
    }

    /// Apply a partial update, re-keying the index when the date changed.
    ///
    /// # Returns
    /// `Ok(Some(job))` when updated, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn update(&self, id: &str, update: &UpdateJobRequest) -> Result<Option<Job>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut jobs = write_txn.open_table(JOBS)?;
            let mut by_customer = write_txn.open_table(JOBS_BY_CUSTOMER)?;

            let Some(old_guard) = jobs.get(id)? else {
                return Ok(None);
            };
            let mut job = deserialize_job(old_guard.value())?;
            drop(old_guard);

            let old_recency_key = reverse_date_key(job.date);
            job.apply_update(update);
            let new_recency_key = reverse_date_key(job.date);
            let encoded = bincode::serialize(&job)?;

            jobs.insert(id, encoded.as_slice())?;
            if old_recency_key != new_recency_key {
                let _ = by_customer.remove((job.customer_id.as_str(), old_recency_key, id))?;
            }
            by_customer.insert((job.customer_id.as_str(), new_recency_key, id), ())?;
            Some(job)
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a job by id.
    ///
    /// # Returns
    /// `true` when a row was deleted, otherwise `false`.
    ///
    /// # Errors
    /// Returns an error when storage or deserialization fails.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut jobs = write_txn.open_table(JOBS)?;
            let mut by_customer = write_txn.open_table(JOBS_BY_CUSTOMER)?;

            let Some(old_guard) = jobs.get(id)? else {
                return Ok(false);
            };
            let job = deserialize_job(old_guard.value())?;
            drop(old_guard);

            let recency_key = reverse_date_key(job.date);
            let _ = by_customer.remove((job.customer_id.as_str(), recency_key, id))?;
            let _ = jobs.remove(id)?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    fn count_matching(&self, predicates: &[Predicate]) -> Result<u64, AppError> {
        let read_txn = self.db.begin_read()?;
        let jobs = read_txn.open_table(JOBS)?;
        let mut count = 0u64;
        for item in jobs.iter()? {
            let (_, value) = item?;
            let job = deserialize_job(value.value())?;
            if predicates.iter().all(|p| p.matches(&job)) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Serve a date-descending page for one customer from the
    /// `(customer_id, reverse-date, id)` index.
    fn indexed_query(&self, query: &PageQuery, customer_id: &str) -> Result<Vec<Job>, AppError> {
        let residual: Vec<&Predicate> = query
            .predicates
            .iter()
            .filter(|p| p.field != "customer_id")
            .collect();

        let read_txn = self.db.begin_read()?;
        let by_customer = read_txn.open_table(JOBS_BY_CUSTOMER)?;
        let jobs = read_txn.open_table(JOBS)?;

        let limit = query.limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        for item in by_customer.iter()? {
            let (key, _) = item?;
            let (owner, recency_key, id) = key.value();
            if owner != customer_id {
                continue;
            }
            if let Some(anchor) = &query.start_after {
                if !after_date_anchor(recency_key, id, anchor) {
                    continue;
                }
            }
            let Some(guard) = jobs.get(id)? else {
                continue;
            };
            let job = deserialize_job(guard.value())?;
            if !residual.iter().all(|p| p.matches(&job)) {
                continue;
            }
            out.push(job);
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }

    fn scan_query(&self, query: &PageQuery) -> Result<Vec<Job>, AppError> {
        let read_txn = self.db.begin_read()?;
        let jobs = read_txn.open_table(JOBS)?;
        let mut rows = Vec::new();
        for item in jobs.iter()? {
            let (_, value) = item?;
            rows.push(deserialize_job(value.value())?);
        }
        Ok(page_from_scan(rows, query))
    }
}

fn after_date_anchor(recency_key: u64, id: &str, anchor: &Anchor) -> bool {
    let OrderKey::Time(anchor_date) = &anchor.key else {
        return true;
    };
    let anchor_key = reverse_date_key(*anchor_date);
    match recency_key.cmp(&anchor_key) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => id > anchor.id.as_str(),
    }
}

pub(crate) fn deserialize_job(bytes: &[u8]) -> Result<Job, bincode::Error> {
    bincode::deserialize(bytes)
}

#[async_trait]
impl RecordGateway<Job> for JobStore {
    async fn query_page(&self, query: PageQuery) -> Result<Vec<Job>, AppError> {
        reject_composite_range(&query.predicates)?;
        let customer_equality = query.predicates.iter().find_map(|p| {
            if p.field != "customer_id" {
                return None;
            }
            match &p.op {
                PredicateOp::Equals(value) => Some(value.clone()),
                PredicateOp::StartsWith(_) => None,
            }
        });
        match customer_equality {
            Some(customer_id)
                if query.order.field == "date"
                    && query.order.direction == SortDirection::Descending =>
            {
                self.indexed_query(&query, &customer_id)
            }
            _ => self.scan_query(&query),
        }
    }

    async fn approx_count(&self, predicates: &[Predicate]) -> Result<u64, AppError> {
        reject_composite_range(predicates)?;
        self.count_matching(predicates)
    }

    async fn create(&self, record: &Job) -> Result<(), AppError> {
        JobStore::create(self, record)
    }

    async fn get(&self, id: &str) -> Result<Option<Job>, AppError> {
        JobStore::get(self, id)
    }

    async fn update(&self, id: &str, update: &UpdateJobRequest) -> Result<Option<Job>, AppError> {
        JobStore::update(self, id, update)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        JobStore::delete(self, id)
    }
}
