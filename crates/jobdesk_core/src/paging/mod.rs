//! Cursor pagination, filtering, and the listing controller.

/// Listing controller owning page state and records.
pub mod controller;
/// Filter set normalization.
pub mod filter;
/// Page boundary bookkeeping.
pub mod ledger;
/// Query strategy selection and page fetching.
pub mod planner;

#[cfg(test)]
mod tests;

pub use controller::{Listing, ListingView, PageState};
pub use filter::{normalize, FilterSet};
pub use ledger::{CursorLedger, LedgerEntry};
pub use planner::{fetch_page, PageRequest, PlannedPage, QueryStrategy};
