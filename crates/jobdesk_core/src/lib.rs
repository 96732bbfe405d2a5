//! Core domain library for JobDesk (config, storage, models, paged listings).

/// Configuration loading and defaults.
pub mod config;
/// Embedded redb-backed storage adapters.
pub mod db;
/// Application error types (storage/domain).
pub mod error;
/// Gateway port traits and query types.
pub mod gateway;
/// Data models for requests and persistence.
pub mod models;
/// Cursor pagination, filtering, and the listing controller.
pub mod paging;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, CountMode};
pub use db::Database;
pub use error::{AppError, ErrorKind};
pub use paging::{FilterSet, Listing, ListingView, PageState};
