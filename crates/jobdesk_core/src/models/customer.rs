//! Customer data models and filters.

use crate::gateway::{OrderBy, OrderKey, Record};
use crate::paging::FilterSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

/// Customer master record stored in the `customers` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Lowercased copy of `name`, kept for prefix search.
    pub name_lower: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub billing_address: String,
    pub post_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub billing_address: String,
    pub post_code: String,
}

/// Request payload for updating a customer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub billing_address: Option<String>,
    pub post_code: Option<String>,
}

/// Sparse customer listing filters as entered by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub post_code: String,
}

impl Customer {
    /// Default listing order: name ascending via the derived lowercase field.
    pub const DEFAULT_ORDER: OrderBy = OrderBy::ascending("name_lower");

    /// Create a new customer with a fresh id and timestamps.
    ///
    /// # Returns
    /// A new [`Customer`] instance.
    pub fn new(request: CreateCustomerRequest) -> Self {
        let now = Utc::now();
        let name_lower = request.name.to_lowercase();
        Self {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            name_lower,
            email: request.email,
            phone: request.phone,
            location: request.location,
            billing_address: request.billing_address,
            post_code: request.post_code,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CustomerFilter {
    /// Convert the raw filter fields into a [`FilterSet`].
    ///
    /// Name filtering targets the derived `name_lower` field and is
    /// case-folded; the remaining fields are plain prefix filters.
    pub fn filter_set(&self) -> FilterSet {
        FilterSet::new()
            .with_folded_prefix("name_lower", self.name.clone())
            .with_prefix("email", self.email.clone())
            .with_prefix("phone", self.phone.clone())
            .with_prefix("location", self.location.clone())
            .with_prefix("post_code", self.post_code.clone())
    }
}

impl Record for Customer {
    type Update = UpdateCustomerRequest;

    const COLLECTION: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }

    fn text_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "id" => Some(Cow::Borrowed(self.id.as_str())),
            "name" => Some(Cow::Borrowed(self.name.as_str())),
            "name_lower" => Some(Cow::Borrowed(self.name_lower.as_str())),
            "email" => Some(Cow::Borrowed(self.email.as_str())),
            "phone" => Some(Cow::Borrowed(self.phone.as_str())),
            "location" => Some(Cow::Borrowed(self.location.as_str())),
            "billing_address" => Some(Cow::Borrowed(self.billing_address.as_str())),
            "post_code" => Some(Cow::Borrowed(self.post_code.as_str())),
            _ => None,
        }
    }

    fn order_key(&self, field: &str) -> Option<OrderKey> {
        match field {
            "name_lower" => Some(OrderKey::Text(self.name_lower.clone())),
            "name" => Some(OrderKey::Text(self.name.clone())),
            "post_code" => Some(OrderKey::Text(self.post_code.clone())),
            "created_at" => Some(OrderKey::Time(self.created_at)),
            "updated_at" => Some(OrderKey::Time(self.updated_at)),
            _ => None,
        }
    }

    fn apply_update(&mut self, update: &Self::Update) {
        if let Some(name) = &update.name {
            self.name = name.clone();
            self.name_lower = name.to_lowercase();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = phone.clone();
        }
        if let Some(location) = &update.location {
            self.location = location.clone();
        }
        if let Some(billing_address) = &update.billing_address {
            self.billing_address = billing_address.clone();
        }
        if let Some(post_code) = &update.post_code {
            self.post_code = post_code.clone();
        }
        self.updated_at = Utc::now();
    }
}
