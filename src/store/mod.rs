//! Product persistence.
//!
//! The store is an injected dependency rather than ambient global state:
//! handlers only see `Arc<dyn ProductStore>`. Two backends exist, a MongoDB
//! implementation for production and an in-memory implementation used by the
//! test suite and selectable through `store_backend` in configuration.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::errors::ServiceError;
use crate::models::{Category, Inventory, Product, Review};

pub use memory::InMemoryProductStore;
pub use mongo::MongoProductStore;

/// Partial update applied to a product. `None` fields are left untouched;
/// supplied fields replace the stored value wholesale (embedded category and
/// inventory included). `updatedAt` is refreshed on every successful update.
#[derive(Debug, Default, Clone)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<Category>,
    pub inventory: Option<Inventory>,
    pub sku: Option<String>,
    pub image: Option<String>,
}

/// Document-store primitives this service needs, keyed by a store-assigned
/// unique id. `sku` uniqueness is enforced at write time by the backend.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new product, assigning its id. Fails with a validation
    /// error on a `sku` collision.
    async fn insert(&self, product: Product) -> Result<Product, ServiceError>;

    /// All products in insertion order, with the `reviews` array omitted.
    async fn list(&self) -> Result<Vec<Product>, ServiceError>;

    /// Full product including reviews, or `None` when no document matches.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Product>, ServiceError>;

    /// Apply a partial update and return the post-update state, or `None`
    /// when no document matches.
    async fn update(
        &self,
        id: ObjectId,
        changes: ProductUpdate,
    ) -> Result<Option<Product>, ServiceError>;

    /// Hard delete; returns the deleted document's prior state.
    async fn delete(&self, id: ObjectId) -> Result<Option<Product>, ServiceError>;

    /// Atomically append a review and return the post-append product, or
    /// `None` when the parent is missing.
    async fn append_review(
        &self,
        id: ObjectId,
        review: Review,
    ) -> Result<Option<Product>, ServiceError>;
}
