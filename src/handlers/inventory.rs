use crate::handlers::common::{
    created_response, map_service_error, success_response, tenant_scope, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::{
    errors::ApiError,
    services::inventory::{AdjustBatchInput, BatchFilter, ReceiveBatchInput},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;

/// Creates the router for inventory read endpoints
pub fn inventory_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_batches))
        .route("/low-stock", get(low_stock))
        .route("/:id", get(get_batch))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BatchListQuery {
    pub worksite_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
}

/// List inventory batches
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(BatchListQuery),
    responses(
        (status = 200, description = "Batch list returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_batches(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<BatchListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let pagination = PaginationParams {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    let filter = BatchFilter {
        worksite_id: query.worksite_id,
        product_id: query.product_id,
    };

    let (batches, total) = state
        .services
        .inventory
        .list_batches(scope, filter, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        batches,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a batch
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    params(("id" = Uuid, Path, description = "Batch id")),
    responses(
        (status = 200, description = "Batch returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_batch(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let batch = state
        .services
        .inventory
        .get_batch(id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(batch))
}

/// Batches below the low-stock threshold
#[utoipa::path(
    get,
    path = "/api/v1/inventory/low-stock",
    responses((status = 200, description = "Low-stock batches returned")),
    tag = "inventory"
)]
pub async fn low_stock(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let batches = state
        .services
        .inventory
        .low_stock(scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(batches))
}

/// Receive stock into a new batch
#[utoipa::path(
    post,
    path = "/api/v1/warehouse/inventory/receive",
    request_body = ReceiveBatchInput,
    responses(
        (status = 201, description = "Batch created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or worksite not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn receive_batch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReceiveBatchInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let batch = state
        .services
        .inventory
        .receive_batch(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(batch))
}

/// Correct a batch's available quantity
#[utoipa::path(
    put,
    path = "/api/v1/warehouse/inventory/{id}/adjust",
    params(("id" = Uuid, Path, description = "Batch id")),
    request_body = AdjustBatchInput,
    responses(
        (status = 200, description = "Batch adjusted"),
        (status = 400, description = "Quantity outside 0..=base", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn adjust_batch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustBatchInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let batch = state
        .services
        .inventory
        .adjust_batch(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(batch))
}
