use crate::handlers::common::{
    created_response, map_service_error, required_tenant, success_response, tenant_scope,
    validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    entities::order::OrderStatus, errors::ApiError, services::orders::CheckoutInput, AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::put,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;

/// Creates the router for back-office order endpoints
pub fn orders_admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/:id/status", put(update_status))
}

/// Convert the cart into an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/checkout",
    request_body = CheckoutInput,
    responses(
        (status = 201, description = "Order created", body = crate::services::orders::OrderDetail),
        (status = 400, description = "Cart empty or quantity outside tiers", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CheckoutInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let tenant_id = required_tenant(&user)?;
    let detail = state
        .services
        .order
        .checkout(tenant_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(detail))
}

/// List orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(PaginationParams),
    responses(
        (status = 200, description = "Order list returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let (orders, total) = state
        .services
        .order
        .list_orders(scope, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        orders,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get an order with its items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order returned", body = crate::services::orders::OrderDetail),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let detail = state
        .services
        .order
        .get_order(id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Move an order along its lifecycle
#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .order
        .update_status(id, payload.status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}
