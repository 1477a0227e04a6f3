//! Persisted document types for the `products` collection.
//!
//! Field names are camelCase both on the wire and in storage. Timestamps are
//! stored as native BSON datetimes; the HTTP layer re-renders them as RFC 3339
//! through its own response types.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embedded category value object. No identity of its own; it travels with
/// its parent product's writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Embedded inventory value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_updated: DateTime<Utc>,
}

impl Inventory {
    pub fn new(quantity: i32, warehouse: Option<String>) -> Self {
        Self {
            quantity,
            warehouse,
            last_updated: Utc::now(),
        }
    }
}

/// Embedded review. Reviews only exist inside a product's `reviews` array;
/// there is no per-review identity, mutation or deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Reference to a user; stored verbatim, never existence-checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(user_id: Option<String>, rating: i32, comment: Option<String>) -> Self {
        Self {
            user_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}

/// Root product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub inventory: Inventory,
    /// Append-only, insertion-ordered. Defaulted so list projections that
    /// drop the array still deserialize.
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new product with creation defaults applied: `active` on, both
    /// timestamps set to the same instant, no reviews yet.
    pub fn new(
        name: String,
        description: String,
        price: f64,
        category: Category,
        inventory: Inventory,
        sku: String,
        image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            description,
            price,
            category,
            inventory,
            reviews: Vec::new(),
            sku,
            image,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
