//! Job (site-visit work record) models.

use crate::gateway::{OrderBy, OrderKey, Record};
use crate::paging::FilterSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

/// One site-visit work record, stored in its own collection with a
/// `customer_id` back-reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub customer_id: String,
    /// Scheduled visit date.
    pub date: DateTime<Utc>,
    pub windows: bool,
    pub gutters: bool,
    pub conservatory: bool,
    pub solar_panels: bool,
    /// Quoted price in minor currency units.
    pub quoted_price: u32,
    pub comments: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a job.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    pub customer_id: String,
    pub date: DateTime<Utc>,
    pub windows: bool,
    pub gutters: bool,
    pub conservatory: bool,
    pub solar_panels: bool,
    pub quoted_price: u32,
    pub comments: String,
}

/// Request payload for updating a job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub date: Option<DateTime<Utc>>,
    pub windows: Option<bool>,
    pub gutters: Option<bool>,
    pub conservatory: Option<bool>,
    pub solar_panels: Option<bool>,
    pub quoted_price: Option<u32>,
    pub comments: Option<String>,
}

impl Job {
    /// Default listing order: most recent visit first.
    pub const DEFAULT_ORDER: OrderBy = OrderBy::descending("date");

    /// Create a new job with a fresh id and timestamps.
    pub fn new(request: CreateJobRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: request.customer_id,
            date: request.date,
            windows: request.windows,
            gutters: request.gutters,
            conservatory: request.conservatory,
            solar_panels: request.solar_panels,
            quoted_price: request.quoted_price,
            comments: request.comments,
            created_at: now,
            updated_at: now,
        }
    }

    /// Filter set selecting the jobs of one customer.
    pub fn for_customer(customer_id: impl Into<String>) -> FilterSet {
        FilterSet::new().with_equals("customer_id", customer_id.into())
    }
}

impl Record for Job {
    type Update = UpdateJobRequest;

    const COLLECTION: &'static str = "jobs";

    fn id(&self) -> &str {
        &self.id
    }

    fn text_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "id" => Some(Cow::Borrowed(self.id.as_str())),
            "customer_id" => Some(Cow::Borrowed(self.customer_id.as_str())),
            "comments" => Some(Cow::Borrowed(self.comments.as_str())),
            _ => None,
        }
    }

    fn order_key(&self, field: &str) -> Option<OrderKey> {
        match field {
            "date" => Some(OrderKey::Time(self.date)),
            "created_at" => Some(OrderKey::Time(self.created_at)),
            "updated_at" => Some(OrderKey::Time(self.updated_at)),
            "quoted_price" => Some(OrderKey::Int(i64::from(self.quoted_price))),
            _ => None,
        }
    }

    fn apply_update(&mut self, update: &Self::Update) {
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(windows) = update.windows {
            self.windows = windows;
        }
        if let Some(gutters) = update.gutters {
            self.gutters = gutters;
        }
        if let Some(conservatory) = update.conservatory {
            self.conservatory = conservatory;
        }
        if let Some(solar_panels) = update.solar_panels {
            self.solar_panels = solar_panels;
        }
        if let Some(quoted_price) = update.quoted_price {
            self.quoted_price = quoted_price;
        }
        if let Some(comments) = &update.comments {
            self.comments = comments.clone();
        }
        self.updated_at = Utc::now();
    }
}
