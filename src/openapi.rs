use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::products;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Catalog API",
        version = "0.1.0",
        description = r#"
REST CRUD service over a product catalog backed by MongoDB.

Products embed a category, an inventory record and an append-only list of
reviews. Reviews support append and list-all only; they have no standalone
identity.

## Error Handling

- `404` with `{"message": "..."}` when no product matches the given id
- `400` with `{"error": "..."}` on validation failures, including `sku`
  uniqueness collisions
- `500` with `{"error": "..."}` on store failures
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product CRUD endpoints"),
        (name = "Reviews", description = "Product review sub-resource")
    ),
    paths(
        products::create_product,
        products::list_products,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::add_review,
        products::list_reviews,
    ),
    components(schemas(
        products::CreateProductRequest,
        products::UpdateProductRequest,
        products::AddReviewRequest,
        products::CategoryPayload,
        products::InventoryPayload,
        products::ProductResponse,
        products::ProductSummaryResponse,
        products::CategoryResponse,
        products::InventoryResponse,
        products::ReviewResponse,
        products::ProductEnvelope,
        products::ProductListEnvelope,
        products::ReviewListEnvelope,
        crate::errors::ErrorResponse,
        crate::errors::NotFoundResponse,
    ))
)]
pub struct ApiDoc;

/// Swagger UI router serving the OpenAPI document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
