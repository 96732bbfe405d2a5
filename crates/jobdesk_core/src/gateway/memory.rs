//! In-memory gateway adapter.

use super::{page_from_scan, reject_composite_range, PageQuery, Predicate, Record, RecordGateway};
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory record collection implementing the gateway port.
///
/// This is the substitutable fake for unit tests and ephemeral tooling. It
/// enforces the same single-range-predicate constraint as the embedded
/// store, so planner fallback boundaries are exercised identically against
/// both adapters.
pub struct MemoryGateway<R> {
    records: RwLock<BTreeMap<String, R>>,
}

impl<R: Record> MemoryGateway<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert records directly, bypassing duplicate-id validation.
    /// Intended for test and seed setup.
    pub fn insert_all(&self, records: impl IntoIterator<Item = R>) {
        let mut map = self.write();
        for record in records {
            map.insert(record.id().to_string(), record);
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, R>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, R>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Record> Default for MemoryGateway<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordGateway<R> for MemoryGateway<R> {
    async fn query_page(&self, query: PageQuery) -> Result<Vec<R>, AppError> {
        reject_composite_range(&query.predicates)?;
        let rows: Vec<R> = self.read().values().cloned().collect();
        Ok(page_from_scan(rows, &query))
    }

    async fn approx_count(&self, predicates: &[Predicate]) -> Result<u64, AppError> {
        reject_composite_range(predicates)?;
        let count = self
            .read()
            .values()
            .filter(|record| predicates.iter().all(|p| p.matches(*record)))
            .count();
        Ok(count as u64)
    }

    async fn create(&self, record: &R) -> Result<(), AppError> {
        let mut map = self.write();
        if map.contains_key(record.id()) {
            return Err(AppError::Write(format!(
                "record id '{}' already exists",
                record.id()
            )));
        }
        map.insert(record.id().to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<R>, AppError> {
        Ok(self.read().get(id).cloned())
    }

    async fn update(&self, id: &str, update: &R::Update) -> Result<Option<R>, AppError> {
        let mut map = self.write();
        let Some(record) = map.get_mut(id) else {
            return Ok(None);
        };
        record.apply_update(update);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.write().remove(id).is_some())
    }
}
