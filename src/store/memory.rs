//! In-memory product store.
//!
//! Behaves identically to the MongoDB backend: insertion order is preserved,
//! `sku` collisions fail the write, and the review append happens atomically
//! under the write lock. Used by the integration tests and selectable in
//! configuration with `store_backend = "in-memory"`.

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::models::{Product, Review};

use super::{ProductStore, ProductUpdate};

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, mut product: Product) -> Result<Product, ServiceError> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.sku == product.sku) {
            return Err(ServiceError::ValidationError(
                "sku must be unique".to_string(),
            ));
        }
        product.id = Some(ObjectId::new());
        products.push(product.clone());
        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.reviews.clear();
                p
            })
            .collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Product>, ServiceError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == Some(id)).cloned())
    }

    async fn update(
        &self,
        id: ObjectId,
        changes: ProductUpdate,
    ) -> Result<Option<Product>, ServiceError> {
        let mut products = self.products.write().await;

        // Missing ids resolve before any constraint check, same as the Mongo
        // backend where `$set` never executes without a matching document.
        let Some(idx) = products.iter().position(|p| p.id == Some(id)) else {
            return Ok(None);
        };

        if let Some(ref sku) = changes.sku {
            if products.iter().any(|p| p.sku == *sku && p.id != Some(id)) {
                return Err(ServiceError::ValidationError(
                    "sku must be unique".to_string(),
                ));
            }
        }

        let product = &mut products[idx];

        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(category) = changes.category {
            product.category = category;
        }
        if let Some(inventory) = changes.inventory {
            product.inventory = inventory;
        }
        if let Some(sku) = changes.sku {
            product.sku = sku;
        }
        if let Some(image) = changes.image {
            product.image = Some(image);
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<Product>, ServiceError> {
        let mut products = self.products.write().await;
        let position = products.iter().position(|p| p.id == Some(id));
        Ok(position.map(|idx| products.remove(idx)))
    }

    async fn append_review(
        &self,
        id: ObjectId,
        review: Review,
    ) -> Result<Option<Product>, ServiceError> {
        let mut products = self.products.write().await;
        let Some(product) = products.iter_mut().find(|p| p.id == Some(id)) else {
            return Ok(None);
        };
        product.reviews.push(review);
        Ok(Some(product.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Inventory};

    fn sample(sku: &str) -> Product {
        Product::new(
            "Widget".to_string(),
            "A widget".to_string(),
            9.99,
            Category {
                name: "Tools".to_string(),
                description: None,
            },
            Inventory::new(10, None),
            sku.to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn insert_assigns_id_and_enforces_sku_uniqueness() {
        let store = InMemoryProductStore::new();
        let created = store.insert(sample("W-100")).await.unwrap();
        assert!(created.id.is_some());

        let err = store.insert(sample("W-100")).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_omits_reviews() {
        let store = InMemoryProductStore::new();
        let created = store.insert(sample("W-100")).await.unwrap();
        let id = created.id.unwrap();
        store
            .append_review(id, Review::new(None, 4, None))
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert!(listed[0].reviews.is_empty());

        let fetched = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.reviews.len(), 1);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_and_leaves_unset_fields() {
        let store = InMemoryProductStore::new();
        let created = store.insert(sample("W-100")).await.unwrap();
        let id = created.id.unwrap();

        let updated = store
            .update(
                id,
                ProductUpdate {
                    price: Some(19.99),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price, 19.99);
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.sku, "W-100");
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_rejects_sku_collision_with_other_product() {
        let store = InMemoryProductStore::new();
        store.insert(sample("W-100")).await.unwrap();
        let second = store.insert(sample("W-200")).await.unwrap();

        let err = store
            .update(
                second.id.unwrap(),
                ProductUpdate {
                    sku: Some("W-100".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_on_missing_id_is_none_even_with_colliding_sku() {
        let store = InMemoryProductStore::new();
        store.insert(sample("W-100")).await.unwrap();

        let result = store
            .update(
                ObjectId::new(),
                ProductUpdate {
                    sku: Some("W-100".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_returns_prior_state() {
        let store = InMemoryProductStore::new();
        let created = store.insert(sample("W-100")).await.unwrap();
        let id = created.id.unwrap();

        let deleted = store.delete(id).await.unwrap().unwrap();
        assert_eq!(deleted.sku, "W-100");
        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(store.delete(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reviews_append_in_order() {
        let store = InMemoryProductStore::new();
        let id = store.insert(sample("W-100")).await.unwrap().id.unwrap();

        for rating in [5, 3, 4] {
            store
                .append_review(id, Review::new(None, rating, None))
                .await
                .unwrap();
        }

        let product = store.find_by_id(id).await.unwrap().unwrap();
        let ratings: Vec<i32> = product.reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5, 3, 4]);
    }

    #[tokio::test]
    async fn missing_id_is_none_everywhere() {
        let store = InMemoryProductStore::new();
        let id = ObjectId::new();
        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(store
            .update(id, ProductUpdate::default())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .append_review(id, Review::new(None, 4, None))
            .await
            .unwrap()
            .is_none());
    }
}
