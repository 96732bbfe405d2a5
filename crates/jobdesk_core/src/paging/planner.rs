//! Query strategy selection and page fetching.

use super::ledger::LedgerEntry;
use crate::config::CountMode;
use crate::error::AppError;
use crate::gateway::{anchor_for, Anchor, OrderBy, PageQuery, Predicate, Record, RecordGateway};

/// How a page request will be satisfied.
///
/// `Native` pushes filtering and ordering down to the gateway.
/// `ClientFiltered` fetches the full ordered collection and filters and
/// slices in memory; it is the escape hatch for predicate combinations the
/// gateway cannot express (more than one range predicate per query).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStrategy {
    Native,
    ClientFiltered,
}

/// Pick the strategy for a normalized predicate list.
pub fn choose_strategy(predicates: &[Predicate]) -> QueryStrategy {
    let range_fields = predicates.iter().filter(|p| p.is_range()).count();
    if range_fields <= 1 {
        QueryStrategy::Native
    } else {
        QueryStrategy::ClientFiltered
    }
}

/// Inputs for one page request.
#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    pub predicates: &'a [Predicate],
    pub order: OrderBy,
    pub page_index: usize,
    pub page_size: usize,
    /// Anchor of the last record on the preceding page; `None` for page 0.
    pub start_after: Option<Anchor>,
}

/// Result of planning and executing one page request.
#[derive(Debug, Clone)]
pub struct PlannedPage<R> {
    pub records: Vec<R>,
    /// Boundary anchors for ledger bookkeeping; `None` when the page came
    /// back empty.
    pub entry: Option<LedgerEntry>,
    pub total: u64,
    pub strategy: QueryStrategy,
}

/// Fetch "page N of filtered, ordered results" from the gateway.
///
/// # Errors
/// Gateway failures surface as-is; the planner does not retry. Retry policy
/// belongs to the caller.
pub async fn fetch_page<R, G>(
    gateway: &G,
    request: PageRequest<'_>,
    count_mode: CountMode,
) -> Result<PlannedPage<R>, AppError>
where
    R: Record,
    G: RecordGateway<R> + ?Sized,
{
    let strategy = choose_strategy(request.predicates);
    tracing::debug!(
        collection = R::COLLECTION,
        page_index = request.page_index,
        ?strategy,
        "planning page fetch"
    );
    match strategy {
        QueryStrategy::Native => fetch_native(gateway, request, count_mode).await,
        QueryStrategy::ClientFiltered => fetch_client_filtered(gateway, request).await,
    }
}

async fn fetch_native<R, G>(
    gateway: &G,
    request: PageRequest<'_>,
    count_mode: CountMode,
) -> Result<PlannedPage<R>, AppError>
where
    R: Record,
    G: RecordGateway<R> + ?Sized,
{
    let records = gateway
        .query_page(PageQuery {
            predicates: request.predicates.to_vec(),
            order: request.order,
            limit: Some(request.page_size),
            start_after: request.start_after.clone(),
        })
        .await?;

    let total = match count_mode {
        CountMode::Approximate => gateway.approx_count(request.predicates).await?,
        CountMode::Exact => {
            let matching = gateway
                .query_page(PageQuery {
                    predicates: request.predicates.to_vec(),
                    order: request.order,
                    limit: None,
                    start_after: None,
                })
                .await?;
            matching.len() as u64
        }
    };

    Ok(assemble(records, total, &request.order, QueryStrategy::Native))
}

async fn fetch_client_filtered<R, G>(
    gateway: &G,
    request: PageRequest<'_>,
) -> Result<PlannedPage<R>, AppError>
where
    R: Record,
    G: RecordGateway<R> + ?Sized,
{
    let all = gateway
        .query_page(PageQuery {
            predicates: Vec::new(),
            order: request.order,
            limit: None,
            start_after: None,
        })
        .await?;

    let filtered: Vec<R> = all
        .into_iter()
        .filter(|record| request.predicates.iter().all(|p| p.matches(record)))
        .collect();
    let total = filtered.len() as u64;

    let start = request.page_index.saturating_mul(request.page_size);
    let end = start.saturating_add(request.page_size).min(filtered.len());
    let records = if start < filtered.len() {
        filtered[start..end].to_vec()
    } else {
        Vec::new()
    };

    Ok(assemble(
        records,
        total,
        &request.order,
        QueryStrategy::ClientFiltered,
    ))
}

fn assemble<R: Record>(
    records: Vec<R>,
    total: u64,
    order: &OrderBy,
    strategy: QueryStrategy,
) -> PlannedPage<R> {
    let entry = match (records.first(), records.last()) {
        (Some(first), Some(last)) => anchor_for(first, order)
            .zip(anchor_for(last, order))
            .map(|(first, last)| LedgerEntry { first, last }),
        _ => None,
    };
    PlannedPage {
        records,
        entry,
        total,
        strategy,
    }
}
