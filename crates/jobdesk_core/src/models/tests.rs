//! Model behavior tests.

use super::customer::{CreateCustomerRequest, Customer, CustomerFilter, UpdateCustomerRequest};
use super::job::{CreateJobRequest, Job, UpdateJobRequest};
use crate::gateway::{PredicateOp, Record};
use crate::paging::normalize;
use chrono::{Duration, Utc};

fn create_request(name: &str) -> CreateCustomerRequest {
    CreateCustomerRequest {
        name: name.to_string(),
        email: "jo@example.com".to_string(),
        phone: "01234 567890".to_string(),
        location: "Leeds".to_string(),
        billing_address: "1 High Street".to_string(),
        post_code: "LS1 1AA".to_string(),
    }
}

#[test]
fn new_customer_derives_lowercase_name() {
    let customer = Customer::new(create_request("Jo SMITH"));
    assert_eq!(customer.name, "Jo SMITH");
    assert_eq!(customer.name_lower, "jo smith");
    assert_eq!(customer.created_at, customer.updated_at);
}

#[test]
fn customer_update_rederives_lowercase_name_and_restamps() {
    let mut customer = Customer::new(create_request("Jo Smith"));
    customer.updated_at = Utc::now() - Duration::seconds(60);
    let before = customer.updated_at;

    customer.apply_update(&UpdateCustomerRequest {
        name: Some("Alex CARTER".to_string()),
        ..UpdateCustomerRequest::default()
    });

    assert_eq!(customer.name, "Alex CARTER");
    assert_eq!(customer.name_lower, "alex carter");
    assert!(customer.updated_at > before);
}

#[test]
fn customer_update_leaves_unset_fields_untouched() {
    let mut customer = Customer::new(create_request("Jo Smith"));
    customer.apply_update(&UpdateCustomerRequest {
        post_code: Some("LS2 9ZZ".to_string()),
        ..UpdateCustomerRequest::default()
    });
    assert_eq!(customer.post_code, "LS2 9ZZ");
    assert_eq!(customer.email, "jo@example.com");
    assert_eq!(customer.name_lower, "jo smith");
}

#[test]
fn customer_filter_folds_name_and_targets_derived_field() {
    let filter = CustomerFilter {
        name: "  Jo ".to_string(),
        post_code: "LS1".to_string(),
        ..CustomerFilter::default()
    };
    let predicates = normalize(&filter.filter_set());
    assert_eq!(predicates.len(), 2);
    assert_eq!(predicates[0].field, "name_lower");
    assert_eq!(predicates[0].op, PredicateOp::StartsWith("jo".to_string()));
    assert_eq!(predicates[1].field, "post_code");
    assert_eq!(predicates[1].op, PredicateOp::StartsWith("LS1".to_string()));
}

#[test]
fn job_filter_selects_by_customer_equality() {
    let predicates = normalize(&Job::for_customer("cust-1"));
    assert_eq!(predicates.len(), 1);
    assert_eq!(predicates[0].field, "customer_id");
    assert_eq!(predicates[0].op, PredicateOp::Equals("cust-1".to_string()));
}

#[test]
fn job_update_applies_work_fields_and_restamps() {
    let mut job = Job::new(CreateJobRequest {
        customer_id: "cust-1".to_string(),
        date: Utc::now(),
        windows: true,
        gutters: false,
        conservatory: false,
        solar_panels: false,
        quoted_price: 2500,
        comments: String::new(),
    });
    job.updated_at = Utc::now() - Duration::seconds(60);
    let before = job.updated_at;

    job.apply_update(&UpdateJobRequest {
        gutters: Some(true),
        quoted_price: Some(4000),
        comments: Some("ladder access at rear".to_string()),
        ..UpdateJobRequest::default()
    });

    assert!(job.gutters);
    assert!(job.windows);
    assert_eq!(job.quoted_price, 4000);
    assert_eq!(job.comments, "ladder access at rear");
    assert!(job.updated_at > before);
}
