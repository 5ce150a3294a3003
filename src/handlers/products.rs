use crate::auth::{permissions as perm, AuthUser};
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    entities::product::ProductStatus,
    errors::ApiError,
    services::catalog::{
        CreateProductInput, LeadTimeTierInput, PriceTierInput, ProductFilter, UpdateProductInput,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

/// Creates the router for catalog read endpoints
pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

/// Creates the router for catalog management endpoints
pub fn catalog_admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_product))
        .route("/:id", put(update_product).delete(archive_product))
        .route("/:id/price-tiers", put(replace_price_tiers))
        .route("/:id/lead-time-tiers", put(replace_lead_time_tiers))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
}

/// List catalog products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Product list returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ProductListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let pagination = PaginationParams {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    // Draft and archived products are a back-office concern. Callers
    // without catalog management rights only ever see active products.
    let status = if user.has_permission(perm::CATALOG_MANAGE) {
        query.status
    } else {
        Some(ProductStatus::Active)
    };
    let filter = ProductFilter {
        category: query.category,
        brand: query.brand,
        search: query.search,
        status,
    };

    let (products, total) = state
        .services
        .catalog
        .list_products(filter, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        products,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a product with its price and lead-time tiers
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product returned", body = crate::services::catalog::ProductDetail),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let detail = state
        .services
        .catalog
        .get_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Create a product with its tier tables
#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = crate::services::catalog::ProductDetail),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .catalog
        .create_product(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(detail))
}

/// Update product fields
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .catalog
        .update_product(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

/// Archive a product
#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product archived"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn archive_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .archive_product(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

/// Replace the price tier table
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{id}/price-tiers",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = Vec<PriceTierInput>,
    responses(
        (status = 200, description = "Price tiers replaced"),
        (status = 400, description = "Invalid tier ranges", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn replace_price_tiers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Vec<PriceTierInput>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    for tier in &payload {
        validate_input(tier)?;
    }
    let tiers = state
        .services
        .catalog
        .replace_price_tiers(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(tiers))
}

/// Replace the lead-time tier table
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{id}/lead-time-tiers",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = Vec<LeadTimeTierInput>,
    responses(
        (status = 200, description = "Lead-time tiers replaced"),
        (status = 400, description = "Invalid tier ranges", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn replace_lead_time_tiers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Vec<LeadTimeTierInput>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    for tier in &payload {
        validate_input(tier)?;
    }
    let tiers = state
        .services
        .catalog
        .replace_lead_time_tiers(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(tiers))
}
