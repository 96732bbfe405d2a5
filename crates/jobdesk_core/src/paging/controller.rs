//! Listing controller: page state, records, navigation, and mutations.
//!
//! One [`Listing`] instance is the single logical owner of one paged view.
//! All state lives behind a mutex that is never held across an await point;
//! every read operation captures an epoch token at initiation and applies
//! its result only while the token is still current, so the last-initiated
//! read always wins regardless of completion order. Dropping the listing
//! drops any in-flight future with it, so nothing touches state after
//! teardown.

use super::filter::{normalize, FilterSet};
use super::ledger::CursorLedger;
use super::planner::{fetch_page, PageRequest, PlannedPage};
use crate::config::CountMode;
use crate::error::{AppError, ErrorKind};
use crate::gateway::{OrderBy, Predicate, Record, RecordGateway};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Pagination metadata derived from the latest successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page_index: usize,
    pub page_size: usize,
    pub total_items: u64,
    /// `ceil(total_items / page_size)`; 0 when the collection is empty.
    pub total_pages: usize,
}

impl PageState {
    /// Pages needed to hold `total_items` at `page_size` records per page.
    pub fn pages_for(total_items: u64, page_size: usize) -> usize {
        if total_items == 0 {
            return 0;
        }
        let size = page_size.max(1) as u64;
        total_items.div_ceil(size) as usize
    }
}

/// Snapshot of the listing for rendering.
#[derive(Debug, Clone)]
pub struct ListingView<R> {
    pub records: Vec<R>,
    pub loading: bool,
    pub error: Option<ErrorKind>,
    pub page: PageState,
}

struct ListingState<R> {
    records: Vec<R>,
    /// Normalized predicates of the current filter session.
    predicates: Vec<Predicate>,
    ledger: CursorLedger,
    page: PageState,
    loading: bool,
    error: Option<ErrorKind>,
    /// Read-generation counter; a read applies only if its captured token
    /// still equals this value when it resolves.
    epoch: u64,
}

/// Paged, filterable listing over one gateway collection.
pub struct Listing<R: Record, G: RecordGateway<R>> {
    gateway: Arc<G>,
    order: OrderBy,
    page_size: usize,
    count_mode: CountMode,
    state: Mutex<ListingState<R>>,
}

impl<R, G> Listing<R, G>
where
    R: Record,
    G: RecordGateway<R>,
{
    /// Create a listing over `gateway` with the given ordering.
    ///
    /// `page_size` is clamped to at least 1. The listing starts empty; call
    /// [`Listing::load`] to run the first fetch.
    pub fn new(gateway: Arc<G>, order: OrderBy, page_size: usize, count_mode: CountMode) -> Self {
        let page_size = page_size.max(1);
        Self {
            gateway,
            order,
            page_size,
            count_mode,
            state: Mutex::new(ListingState {
                records: Vec::new(),
                predicates: Vec::new(),
                ledger: CursorLedger::new(),
                page: PageState {
                    page_index: 0,
                    page_size,
                    total_items: 0,
                    total_pages: 0,
                },
                loading: false,
                error: None,
                epoch: 0,
            }),
        }
    }

    /// Start a fresh filter session: normalize `filters`, reset the ledger
    /// and page index, and fetch page 0.
    ///
    /// Concurrent calls are safe; the last call to be initiated wins and
    /// superseded in-flight loads resolve without touching state.
    ///
    /// # Errors
    /// Returns the gateway error when the fetch fails; the error is also
    /// recorded in the listing state until the next successful operation.
    pub async fn load(&self, filters: &FilterSet) -> Result<(), AppError> {
        let predicates = normalize(filters);
        let token = {
            let mut state = self.lock();
            state.epoch += 1;
            state.loading = true;
            state.predicates = predicates.clone();
            state.ledger.reset();
            state.epoch
        };
        let outcome = fetch_page(
            self.gateway.as_ref(),
            PageRequest {
                predicates: &predicates,
                order: self.order,
                page_index: 0,
                page_size: self.page_size,
                start_after: None,
            },
            self.count_mode,
        )
        .await;
        self.apply_read(token, 0, outcome)
    }

    /// Advance to the next page.
    ///
    /// No-op while a read is in flight or when already on the last page.
    ///
    /// # Errors
    /// Returns the gateway error when the fetch fails.
    pub async fn next(&self) -> Result<(), AppError> {
        let (token, predicates, target, anchor) = {
            let mut state = self.lock();
            if state.loading {
                return Ok(());
            }
            if state.page.total_pages == 0 || state.page.page_index + 1 >= state.page.total_pages {
                return Ok(());
            }
            let Some(entry) = state.ledger.get(state.page.page_index) else {
                tracing::warn!(
                    collection = R::COLLECTION,
                    page_index = state.page.page_index,
                    "missing ledger entry for current page; ignoring next()"
                );
                return Ok(());
            };
            let anchor = entry.last.clone();
            state.epoch += 1;
            state.loading = true;
            (
                state.epoch,
                state.predicates.clone(),
                state.page.page_index + 1,
                Some(anchor),
            )
        };
        let outcome = fetch_page(
            self.gateway.as_ref(),
            PageRequest {
                predicates: &predicates,
                order: self.order,
                page_index: target,
                page_size: self.page_size,
                start_after: anchor,
            },
            self.count_mode,
        )
        .await;
        self.apply_read(token, target, outcome)
    }

    /// Step back to the previous page, re-deriving it from the ledger
    /// rather than trusting stale local data.
    ///
    /// No-op while a read is in flight or when already on page 0.
    ///
    /// # Errors
    /// Returns the gateway error when the fetch fails.
    pub async fn previous(&self) -> Result<(), AppError> {
        let (token, predicates, target, anchor) = {
            let mut state = self.lock();
            if state.loading || state.page.page_index == 0 {
                return Ok(());
            }
            let target = state.page.page_index - 1;
            let anchor = if target == 0 {
                None
            } else {
                match state.ledger.get(target - 1) {
                    Some(entry) => Some(entry.last.clone()),
                    None => {
                        tracing::warn!(
                            collection = R::COLLECTION,
                            target,
                            "missing ledger entry for previous page; ignoring previous()"
                        );
                        return Ok(());
                    }
                }
            };
            state.epoch += 1;
            state.loading = true;
            (state.epoch, state.predicates.clone(), target, anchor)
        };
        let outcome = fetch_page(
            self.gateway.as_ref(),
            PageRequest {
                predicates: &predicates,
                order: self.order,
                page_index: target,
                page_size: self.page_size,
                start_after: anchor,
            },
            self.count_mode,
        )
        .await;
        self.apply_read(token, target, outcome)
    }

    /// Re-fetch the current page with the current filters, clamping the
    /// page index back into range when the collection shrank underneath it.
    ///
    /// # Errors
    /// Returns the gateway error when the fetch fails.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let (token, predicates, mut target) = {
            let mut state = self.lock();
            state.epoch += 1;
            state.loading = true;
            (state.epoch, state.predicates.clone(), state.page.page_index)
        };
        loop {
            let anchor = {
                let state = self.lock();
                if state.epoch != token {
                    tracing::debug!(collection = R::COLLECTION, "discarding superseded refresh");
                    return Ok(());
                }
                if target == 0 {
                    None
                } else {
                    state.ledger.get(target - 1).map(|entry| entry.last.clone())
                }
            };
            if target > 0 && anchor.is_none() {
                // Ledger no longer covers the target page; restart at 0.
                target = 0;
                continue;
            }
            let outcome = fetch_page(
                self.gateway.as_ref(),
                PageRequest {
                    predicates: &predicates,
                    order: self.order,
                    page_index: target,
                    page_size: self.page_size,
                    start_after: anchor,
                },
                self.count_mode,
            )
            .await;
            let page = match outcome {
                Ok(page) => page,
                Err(err) => return self.apply_read(token, target, Err(err)),
            };
            let total_pages = PageState::pages_for(page.total, self.page_size);
            let out_of_range = target > 0
                && (total_pages == 0
                    || target > total_pages - 1
                    || (page.records.is_empty() && page.total > 0));
            if out_of_range {
                let clamped = if total_pages == 0 {
                    0
                } else {
                    target.saturating_sub(1).min(total_pages - 1)
                };
                tracing::debug!(
                    collection = R::COLLECTION,
                    from = target,
                    to = clamped,
                    "page index fell out of range; clamping"
                );
                {
                    let mut state = self.lock();
                    if state.epoch != token {
                        return Ok(());
                    }
                    state.ledger.truncate(clamped);
                }
                target = clamped;
                continue;
            }
            return self.apply_read(token, target, Ok(page));
        }
    }

    /// Create a record, then refresh so the visible page and totals stay
    /// consistent with the mutation.
    ///
    /// # Errors
    /// `AppError::Write`/storage errors when the gateway rejects the
    /// insert; refresh errors surface as for [`Listing::refresh`].
    pub async fn create(&self, record: &R) -> Result<(), AppError> {
        if let Err(err) = self.gateway.create(record).await {
            self.lock().error = Some(ErrorKind::write(&err));
            return Err(err);
        }
        self.refresh().await
    }

    /// Apply a partial update to a record, then refresh.
    ///
    /// # Errors
    /// `AppError::NotFound` when `id` no longer exists; write errors when
    /// the gateway rejects the update.
    pub async fn update(&self, id: &str, update: &R::Update) -> Result<(), AppError> {
        match self.gateway.update(id, update).await {
            Ok(Some(_)) => self.refresh().await,
            Ok(None) => {
                self.lock().error = Some(ErrorKind::NotFound);
                Err(AppError::NotFound)
            }
            Err(err) => {
                self.lock().error = Some(ErrorKind::write(&err));
                Err(err)
            }
        }
    }

    /// Delete a record, then refresh. Deleting the last record of the last
    /// page clamps the page index back into range.
    ///
    /// # Errors
    /// `AppError::NotFound` when `id` no longer exists; write errors when
    /// the gateway rejects the delete.
    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        match self.gateway.delete(id).await {
            Ok(true) => self.refresh().await,
            Ok(false) => {
                self.lock().error = Some(ErrorKind::NotFound);
                Err(AppError::NotFound)
            }
            Err(err) => {
                self.lock().error = Some(ErrorKind::write(&err));
                Err(err)
            }
        }
    }

    /// Current records, loading flag, error, and page state.
    pub fn view(&self) -> ListingView<R> {
        let state = self.lock();
        ListingView {
            records: state.records.clone(),
            loading: state.loading,
            error: state.error.clone(),
            page: state.page,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListingState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold a resolved read into state, unless a newer operation has
    /// superseded it (an expected, non-error outcome of concurrent reads).
    fn apply_read(
        &self,
        token: u64,
        page_index: usize,
        outcome: Result<PlannedPage<R>, AppError>,
    ) -> Result<(), AppError> {
        let mut state = self.lock();
        if state.epoch != token {
            tracing::debug!(collection = R::COLLECTION, page_index, "discarding stale read");
            return Ok(());
        }
        state.loading = false;
        match outcome {
            Ok(page) => {
                state.error = None;
                let total_pages = PageState::pages_for(page.total, self.page_size);
                if page_index > 0 && page_index >= total_pages {
                    tracing::warn!(
                        collection = R::COLLECTION,
                        page_index,
                        total_pages,
                        "page index out of range after fetch"
                    );
                }
                state.page = PageState {
                    page_index,
                    page_size: self.page_size,
                    total_items: page.total,
                    total_pages,
                };
                match page.entry {
                    Some(entry) => {
                        if page_index < state.ledger.len() {
                            state.ledger.set(page_index, entry);
                        } else if page_index == state.ledger.len() {
                            state.ledger.push(entry);
                        } else {
                            tracing::warn!(
                                collection = R::COLLECTION,
                                page_index,
                                ledger_len = state.ledger.len(),
                                "ledger gap while recording page boundaries"
                            );
                        }
                        state.ledger.truncate(page_index + 1);
                    }
                    None => state.ledger.truncate(page_index),
                }
                state.records = page.records;
                Ok(())
            }
            Err(err) => {
                state.error = Some(ErrorKind::read(&err));
                Err(err)
            }
        }
    }
}
