//! Mutation-then-refresh behavior, including page-index clamping.

use super::{name_filter, seeded_listing};
use crate::error::{AppError, ErrorKind};
use crate::models::customer::{CustomerFilter, UpdateCustomerRequest};
use crate::paging::{FilterSet, QueryStrategy};
use crate::test_support::sample_customer;

#[tokio::test]
async fn create_refreshes_totals_in_place() {
    let listing = seeded_listing(9, 10);
    listing.load(&FilterSet::new()).await.expect("load");
    assert_eq!(listing.view().page.total_pages, 1);

    listing
        .create(&sample_customer("zz1", "Zz Extra One"))
        .await
        .expect("create");
    listing
        .create(&sample_customer("zz2", "Zz Extra Two"))
        .await
        .expect("create");

    let view = listing.view();
    assert_eq!(view.page.total_items, 11);
    assert_eq!(view.page.total_pages, 2);
    assert_eq!(view.page.page_index, 0);
    assert_eq!(view.records.len(), 10);
}

#[tokio::test]
async fn removing_the_sole_record_of_the_last_page_clamps_back() {
    let listing = seeded_listing(21, 10);
    listing.load(&FilterSet::new()).await.expect("load");
    listing.next().await.expect("next");
    listing.next().await.expect("next");

    let view = listing.view();
    assert_eq!(view.page.page_index, 2);
    assert_eq!(view.records.len(), 1);
    let lone_id = view.records[0].id.clone();

    listing.remove(&lone_id).await.expect("remove");

    let view = listing.view();
    assert_eq!(view.page.total_items, 20);
    assert_eq!(view.page.total_pages, 2);
    assert_eq!(view.page.page_index, 1);
    assert_eq!(view.records.len(), 10);
    assert_eq!(view.records[0].name, "Customer 10");
    assert!(view.error.is_none());
}

#[tokio::test]
async fn removing_the_only_record_returns_to_an_empty_listing() {
    let listing = seeded_listing(1, 10);
    listing.load(&FilterSet::new()).await.expect("load");

    listing.remove("c00").await.expect("remove");
    let view = listing.view();
    assert_eq!(view.page.total_items, 0);
    assert_eq!(view.page.total_pages, 0);
    assert_eq!(view.page.page_index, 0);
    assert!(view.records.is_empty());
}

#[tokio::test]
async fn update_reorders_the_visible_page() {
    let listing = seeded_listing(5, 10);
    listing.load(&FilterSet::new()).await.expect("load");

    listing
        .update(
            "c04",
            &UpdateCustomerRequest {
                name: Some("Aaa Moved First".to_string()),
                ..UpdateCustomerRequest::default()
            },
        )
        .await
        .expect("update");

    let view = listing.view();
    assert_eq!(view.records[0].id, "c04");
    assert_eq!(view.records[0].name, "Aaa Moved First");
}

#[tokio::test]
async fn missing_ids_surface_not_found_and_clear_on_success() {
    let listing = seeded_listing(3, 10);
    listing.load(&FilterSet::new()).await.expect("load");

    let err = listing
        .update("ghost", &UpdateCustomerRequest::default())
        .await
        .expect_err("missing id");
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(listing.view().error, Some(ErrorKind::NotFound));

    let err = listing.remove("ghost").await.expect_err("missing id");
    assert!(matches!(err, AppError::NotFound));

    // The next successful operation clears the stored error.
    listing.load(&FilterSet::new()).await.expect("load");
    assert!(listing.view().error.is_none());
}

#[tokio::test]
async fn duplicate_create_records_a_write_error() {
    let listing = seeded_listing(3, 10);
    listing.load(&FilterSet::new()).await.expect("load");

    let err = listing
        .create(&sample_customer("c00", "Customer 00"))
        .await
        .expect_err("duplicate id");
    assert!(matches!(err, AppError::Write(_)));
    assert!(matches!(listing.view().error, Some(ErrorKind::Write(_))));
}

#[tokio::test]
async fn two_prefix_filters_fall_back_to_client_side_filtering() {
    use crate::gateway::Predicate;
    use crate::paging::planner::choose_strategy;

    let filters = CustomerFilter {
        name: "Customer 1".to_string(),
        post_code: "LS1".to_string(),
        ..CustomerFilter::default()
    }
    .filter_set();
    let predicates = crate::paging::normalize(&filters);
    assert_eq!(choose_strategy(&predicates), QueryStrategy::ClientFiltered);
    assert_eq!(
        choose_strategy(&[Predicate::starts_with("name_lower", "jo")]),
        QueryStrategy::Native
    );

    let listing = seeded_listing(25, 10);
    listing.load(&filters).await.expect("load");

    // "Customer 1" matches 10..=19; every seeded post code starts with LS1.
    let view = listing.view();
    assert_eq!(view.page.total_items, 10);
    assert_eq!(view.page.total_pages, 1);
    assert_eq!(view.records.len(), 10);
    assert_eq!(view.records[0].name, "Customer 10");
    assert!(view.error.is_none());
}

#[tokio::test]
async fn client_filtered_pages_slice_and_navigate_consistently() {
    let listing = seeded_listing(25, 4);
    let filters = CustomerFilter {
        name: "Customer".to_string(),
        post_code: "LS".to_string(),
        ..CustomerFilter::default()
    }
    .filter_set();

    listing.load(&filters).await.expect("load");
    let view = listing.view();
    assert_eq!(view.page.total_items, 25);
    assert_eq!(view.page.total_pages, 7);

    listing.next().await.expect("next");
    let view = listing.view();
    assert_eq!(view.page.page_index, 1);
    assert_eq!(view.records[0].name, "Customer 04");

    listing.previous().await.expect("previous");
    assert_eq!(listing.view().records[0].name, "Customer 00");
}

#[tokio::test]
async fn filtered_deletes_keep_counts_consistent() {
    let listing = seeded_listing(25, 10);
    listing.load(&name_filter("customer 2")).await.expect("load");
    assert_eq!(listing.view().page.total_items, 5);

    listing.remove("c21").await.expect("remove");
    let view = listing.view();
    assert_eq!(view.page.total_items, 4);
    assert_eq!(view.records.len(), 4);
}
