//! Product CRUD endpoints plus the reviews sub-resource.
//!
//! Seven handlers, each a stateless request-to-response transform over a
//! single store call. Reviews support append and list-all only; individual
//! reviews have no identity and cannot be mutated or deleted.

use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::models::{Category, Inventory, Product, Review};
use crate::store::ProductUpdate;
use crate::AppState;

const PRODUCT_NOT_FOUND: &str = "Product not found";

fn normalize_string(value: String) -> String {
    value.trim().to_string()
}

fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .and_then(|v| if v.is_empty() { None } else { Some(v) })
}

fn ensure_price_non_negative(value: f64) -> Result<(), ApiError> {
    if value < 0.0 {
        Err(ApiError::ValidationError(
            "price cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// An id that does not parse cannot match any document.
fn parse_object_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))
}

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id", put(update_product))
        .route("/products/:id", delete(delete_product))
        .route("/products/:id/reviews", post(add_review))
        .route("/products/:id/reviews", get(list_reviews))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductEnvelope),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let CreateProductRequest {
        name,
        description,
        price,
        category,
        inventory,
        sku,
        image,
    } = payload;

    let name = name
        .map(normalize_string)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::ValidationError("name is required".to_string()))?;
    let description = description
        .map(normalize_string)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::ValidationError("description is required".to_string()))?;
    let sku = sku
        .map(normalize_string)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::ValidationError("sku is required".to_string()))?;
    let price =
        price.ok_or_else(|| ApiError::ValidationError("price is required".to_string()))?;
    ensure_price_non_negative(price)?;

    let category = category
        .ok_or_else(|| ApiError::ValidationError("category is required".to_string()))?
        .into_category()?;
    let inventory = inventory
        .ok_or_else(|| ApiError::ValidationError("inventory is required".to_string()))?
        .into_inventory();
    let image = normalize_optional_string(image);

    let product = Product::new(name, description, price, category, inventory, sku, image);
    let product = state
        .store
        .insert(product)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(ProductEnvelope {
        message: "Product created successfully".to_string(),
        product: ProductResponse::from(product),
    }))
}

/// List all products, reviews omitted
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Products retrieved", body = ProductListEnvelope)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let products = state.store.list().await.map_err(map_service_error)?;

    Ok(success_response(ProductListEnvelope {
        message: "Products retrieved successfully".to_string(),
        products: products
            .into_iter()
            .map(ProductSummaryResponse::from)
            .collect(),
    }))
}

/// Get a product by id, reviews included
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product retrieved", body = ProductEnvelope),
        (status = 404, description = "Product not found", body = crate::errors::NotFoundResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let product = state
        .store
        .find_by_id(id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    Ok(success_response(ProductEnvelope {
        message: "Product retrieved successfully".to_string(),
        product: ProductResponse::from(product),
    }))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductEnvelope),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::NotFoundResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    validate_input(&payload)?;

    let UpdateProductRequest {
        name,
        description,
        price,
        category,
        inventory,
        sku,
        image,
    } = payload;

    let name = name
        .map(normalize_string)
        .map(|v| {
            if v.is_empty() {
                Err(ApiError::ValidationError(
                    "name cannot be blank".to_string(),
                ))
            } else {
                Ok(v)
            }
        })
        .transpose()?;
    let description = description
        .map(normalize_string)
        .map(|v| {
            if v.is_empty() {
                Err(ApiError::ValidationError(
                    "description cannot be blank".to_string(),
                ))
            } else {
                Ok(v)
            }
        })
        .transpose()?;
    let sku = sku
        .map(normalize_string)
        .map(|v| {
            if v.is_empty() {
                Err(ApiError::ValidationError("sku cannot be blank".to_string()))
            } else {
                Ok(v)
            }
        })
        .transpose()?;

    if let Some(value) = price {
        ensure_price_non_negative(value)?;
    }

    let category = category.map(CategoryPayload::into_category).transpose()?;
    // A replaced inventory sub-document gets a fresh lastUpdated, same as at
    // creation time.
    let inventory = inventory.map(InventoryPayload::into_inventory);

    let changes = ProductUpdate {
        name,
        description,
        price,
        category,
        inventory,
        sku,
        image: normalize_optional_string(image),
    };

    let product = state
        .store
        .update(id, changes)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    Ok(success_response(ProductEnvelope {
        message: "Product updated successfully".to_string(),
        product: ProductResponse::from(product),
    }))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = ProductEnvelope),
        (status = 404, description = "Product not found", body = crate::errors::NotFoundResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let product = state
        .store
        .delete(id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    Ok(success_response(ProductEnvelope {
        message: "Product deleted successfully".to_string(),
        product: ProductResponse::from(product),
    }))
}

/// Append a review to a product
#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    params(("id" = String, Path, description = "Product id")),
    request_body = AddReviewRequest,
    responses(
        (status = 201, description = "Review added", body = ProductEnvelope),
        (status = 400, description = "Invalid rating", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::NotFoundResponse)
    ),
    tag = "Reviews"
)]
pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AddReviewRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    validate_input(&payload)?;

    let rating = payload
        .rating
        .ok_or_else(|| ApiError::ValidationError("rating is required".to_string()))?;
    if !(1..=5).contains(&rating) {
        return Err(ApiError::ValidationError(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let review = Review::new(
        normalize_optional_string(payload.user_id),
        rating,
        normalize_optional_string(payload.comment),
    );

    let product = state
        .store
        .append_review(id, review)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    Ok(created_response(ProductEnvelope {
        message: "Review added successfully".to_string(),
        product: ProductResponse::from(product),
    }))
}

/// List a product's reviews
#[utoipa::path(
    get,
    path = "/products/{id}/reviews",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Reviews retrieved", body = ReviewListEnvelope),
        (status = 404, description = "Product not found", body = crate::errors::NotFoundResponse)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let product = state
        .store
        .find_by_id(id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    Ok(success_response(ReviewListEnvelope {
        message: "Reviews retrieved successfully".to_string(),
        reviews: product.reviews.into_iter().map(ReviewResponse::from).collect(),
    }))
}

// Request/Response DTOs

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryPayload {
    #[serde(default)]
    #[schema(example = "Tools")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryPayload {
    fn into_category(self) -> Result<Category, ApiError> {
        let name = self
            .name
            .map(normalize_string)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::ValidationError("category.name is required".to_string()))?;
        Ok(Category {
            name,
            description: normalize_optional_string(self.description),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryPayload {
    /// Defaults to 0 when omitted
    #[serde(default)]
    #[schema(example = 10)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub warehouse: Option<String>,
}

impl InventoryPayload {
    fn into_inventory(self) -> Inventory {
        Inventory::new(
            self.quantity.unwrap_or(0),
            normalize_optional_string(self.warehouse),
        )
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Widget",
    "description": "A widget",
    "price": 9.99,
    "category": { "name": "Tools" },
    "inventory": { "quantity": 10 },
    "sku": "W-100"
}))]
pub struct CreateProductRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<CategoryPayload>,
    #[serde(default)]
    pub inventory: Option<InventoryPayload>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub sku: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<CategoryPayload>,
    #[serde(default)]
    pub inventory: Option<InventoryPayload>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub sku: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "userId": "u1", "rating": 5, "comment": "great" }))]
pub struct AddReviewRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            name: category.name,
            description: category.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl From<Inventory> for InventoryResponse {
    fn from(inventory: Inventory) -> Self {
        Self {
            quantity: inventory.quantity,
            warehouse: inventory.warehouse,
            last_updated: inventory.last_updated,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

/// Full product representation, reviews included.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Store-assigned id (hex)
    #[schema(example = "665f1f77bcf86cd799439011")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: CategoryResponse,
    pub inventory: InventoryResponse,
    pub reviews: Vec<ReviewResponse>,
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category.into(),
            inventory: product.inventory.into(),
            reviews: product.reviews.into_iter().map(ReviewResponse::from).collect(),
            sku: product.sku,
            image: product.image,
            active: product.active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// List representation: identical to [`ProductResponse`] minus the reviews
/// array, which list responses never carry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummaryResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: CategoryResponse,
    pub inventory: InventoryResponse,
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductSummaryResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category.into(),
            inventory: product.inventory.into(),
            sku: product.sku,
            image: product.image,
            active: product.active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductEnvelope {
    pub message: String,
    pub product: ProductResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListEnvelope {
    pub message: String,
    pub products: Vec<ProductSummaryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListEnvelope {
    pub message: String,
    pub reviews: Vec<ReviewResponse>,
}
