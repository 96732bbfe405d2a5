//! Listing controller scenario tests.

use crate::config::CountMode;
use crate::gateway::memory::MemoryGateway;
use crate::models::customer::{Customer, CustomerFilter};
use crate::paging::{FilterSet, Listing};
use crate::test_support::sample_fleet;
use std::sync::Arc;

mod mutations;

fn seeded_listing(count: usize, page_size: usize) -> Listing<Customer, MemoryGateway<Customer>> {
    let gateway = MemoryGateway::new();
    gateway.insert_all(sample_fleet(count));
    Listing::new(
        Arc::new(gateway),
        Customer::DEFAULT_ORDER,
        page_size,
        CountMode::Approximate,
    )
}

fn name_filter(value: &str) -> FilterSet {
    CustomerFilter {
        name: value.to_string(),
        ..CustomerFilter::default()
    }
    .filter_set()
}

fn record_ids(listing: &Listing<Customer, MemoryGateway<Customer>>) -> Vec<String> {
    listing
        .view()
        .records
        .into_iter()
        .map(|customer| customer.id)
        .collect()
}
