//! MongoDB product store.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::models::{Product, Review};

use super::{ProductStore, ProductUpdate};

const COLLECTION_NAME: &str = "products";

#[derive(Debug, Clone)]
pub struct MongoProductStore {
    collection: Collection<Product>,
}

impl MongoProductStore {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION_NAME),
        }
    }

    /// Create the unique `sku` index. Must run before the first write so a
    /// duplicate sku fails the insert instead of landing as a second document.
    pub async fn ensure_indexes(&self) -> Result<(), ServiceError> {
        let index = IndexModel::builder()
            .keys(doc! { "sku": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        info!("Ensured unique index on products.sku");
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    #[instrument(skip(self, product), fields(sku = %product.sku))]
    async fn insert(&self, mut product: Product) -> Result<Product, ServiceError> {
        product.id = Some(ObjectId::new());
        self.collection.insert_one(&product).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let cursor = self
            .collection
            .find(doc! {})
            .projection(doc! { "reviews": 0 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Product>, ServiceError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: ObjectId,
        changes: ProductUpdate,
    ) -> Result<Option<Product>, ServiceError> {
        let mut set = doc! { "updatedAt": Bson::DateTime(Utc::now().into()) };
        if let Some(name) = changes.name {
            set.insert("name", name);
        }
        if let Some(description) = changes.description {
            set.insert("description", description);
        }
        if let Some(price) = changes.price {
            set.insert("price", price);
        }
        if let Some(category) = changes.category {
            set.insert("category", bson::to_bson(&category)?);
        }
        if let Some(inventory) = changes.inventory {
            set.insert("inventory", bson::to_bson(&inventory)?);
        }
        if let Some(sku) = changes.sku {
            set.insert("sku", sku);
        }
        if let Some(image) = changes.image {
            set.insert("image", image);
        }

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> Result<Option<Product>, ServiceError> {
        Ok(self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?)
    }

    #[instrument(skip(self, review))]
    async fn append_review(
        &self,
        id: ObjectId,
        review: Review,
    ) -> Result<Option<Product>, ServiceError> {
        // Atomic array append; the original read-modify-save cycle had a
        // concurrent-append race window this closes.
        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$push": { "reviews": bson::to_bson(&review)? } },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }
}
