//! Shared test-only helpers for jobdesk_core.

use crate::db::Database;
use crate::error::AppError;
use crate::gateway::memory::MemoryGateway;
use crate::gateway::{PageQuery, Predicate, Record, RecordGateway};
use crate::models::customer::{CreateCustomerRequest, Customer};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing
/// files.
///
/// # Panics
/// Panics if temp-dir creation, path conversion, or database initialization
/// fails in the test environment.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// A customer with a fixed id, so ordering tie-breaks are predictable.
pub(crate) fn sample_customer(id: &str, name: &str) -> Customer {
    let mut customer = Customer::new(CreateCustomerRequest {
        name: name.to_string(),
        email: format!("{id}@example.com"),
        phone: "01234 567890".to_string(),
        location: "Leeds".to_string(),
        billing_address: "1 High Street".to_string(),
        post_code: "LS1 1AA".to_string(),
    });
    customer.id = id.to_string();
    customer
}

/// `count` customers with zero-padded names, so name order matches id order.
pub(crate) fn sample_fleet(count: usize) -> Vec<Customer> {
    (0..count)
        .map(|i| sample_customer(&format!("c{i:02}"), &format!("Customer {i:02}")))
        .collect()
}

/// Gateway wrapper that injects one queued delay per read call.
///
/// Paused-time tests use this to script which of two racing reads resolves
/// first. Writes are never delayed; an empty queue means reads resolve
/// immediately.
pub(crate) struct DelayedGateway<R: Record> {
    inner: MemoryGateway<R>,
    delays: Mutex<VecDeque<Duration>>,
}

impl<R: Record> DelayedGateway<R> {
    pub(crate) fn new(inner: MemoryGateway<R>) -> Self {
        Self {
            inner,
            delays: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn queue_delay(&self, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(delay);
    }

    async fn pause(&self) {
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<R: Record> RecordGateway<R> for DelayedGateway<R> {
    async fn query_page(&self, query: PageQuery) -> Result<Vec<R>, AppError> {
        self.pause().await;
        self.inner.query_page(query).await
    }

    async fn approx_count(&self, predicates: &[Predicate]) -> Result<u64, AppError> {
        self.inner.approx_count(predicates).await
    }

    async fn create(&self, record: &R) -> Result<(), AppError> {
        self.inner.create(record).await
    }

    async fn get(&self, id: &str) -> Result<Option<R>, AppError> {
        self.inner.get(id).await
    }

    async fn update(&self, id: &str, update: &R::Update) -> Result<Option<R>, AppError> {
        self.inner.update(id, update).await
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        self.inner.delete(id).await
    }
}
