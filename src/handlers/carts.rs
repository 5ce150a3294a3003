use crate::handlers::common::{
    created_response, map_service_error, no_content_response, required_tenant, success_response,
    validate_input,
};
use crate::{errors::ApiError, services::carts::AddCartItemInput, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;

/// Creates the router for cart endpoints. The cart is implicit per
/// tenant, so no cart id appears in the paths.
pub fn carts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:item_id", put(update_item).delete(remove_item))
        .route("/refresh-prices", post(refresh_prices))
}

/// Get the cart with line and cart totals
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart returned", body = crate::services::carts::CartView),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let tenant_id = required_tenant(&user)?;
    let cart = state
        .services
        .cart
        .list_cart(tenant_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

/// Add a product variant to the cart
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddCartItemInput,
    responses(
        (status = 201, description = "Line added or merged"),
        (status = 400, description = "Quantity outside price tiers", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<AddCartItemInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let tenant_id = required_tenant(&user)?;
    let item = state
        .services
        .cart
        .add_item(tenant_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(item))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 0))]
    pub quantity: i32,
}

/// Change a line's quantity (zero removes the line)
#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{item_id}",
    params(("item_id" = Uuid, Path, description = "Cart line id")),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Line updated"),
        (status = 204, description = "Line removed"),
        (status = 404, description = "Line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let tenant_id = required_tenant(&user)?;
    let updated = state
        .services
        .cart
        .update_quantity(tenant_id, item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;
    Ok(match updated {
        Some(item) => success_response(item),
        None => no_content_response(),
    })
}

/// Remove a line from the cart
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{item_id}",
    params(("item_id" = Uuid, Path, description = "Cart line id")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 404, description = "Line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let tenant_id = required_tenant(&user)?;
    state
        .services
        .cart
        .remove_item(tenant_id, item_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

/// Re-capture every line's price from the current tiers
#[utoipa::path(
    post,
    path = "/api/v1/cart/refresh-prices",
    responses(
        (status = 200, description = "Cart returned with refreshed prices", body = crate::services::carts::CartView),
        (status = 400, description = "A line no longer fits any tier", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn refresh_prices(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let tenant_id = required_tenant(&user)?;
    let cart = state
        .services
        .cart
        .refresh_prices(tenant_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

/// Empty the cart
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    responses((status = 204, description = "Cart cleared")),
    tag = "cart"
)]
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let tenant_id = required_tenant(&user)?;
    state
        .services
        .cart
        .clear(tenant_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
