use crate::handlers::common::{
    created_response, map_service_error, no_content_response, required_tenant, success_response,
    tenant_scope, validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    errors::ApiError,
    services::worksites::{CreateWorksiteInput, UpdateWorksiteInput},
    AppState,
};
use axum::extract::{Json, Path, Query, State};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthUser;

/// Create a worksite
#[utoipa::path(
    post,
    path = "/api/v1/worksites",
    request_body = CreateWorksiteInput,
    responses(
        (status = 201, description = "Worksite created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "worksites"
)]
pub async fn create_worksite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateWorksiteInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let tenant_id = required_tenant(&user)?;
    let worksite = state
        .services
        .worksite
        .create_worksite(tenant_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(worksite))
}

/// List worksites
#[utoipa::path(
    get,
    path = "/api/v1/worksites",
    params(PaginationParams),
    responses((status = 200, description = "Worksite list returned")),
    tag = "worksites"
)]
pub async fn list_worksites(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let (worksites, total) = state
        .services
        .worksite
        .list_worksites(scope, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        worksites,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a worksite
#[utoipa::path(
    get,
    path = "/api/v1/worksites/{id}",
    params(("id" = Uuid, Path, description = "Worksite id")),
    responses(
        (status = 200, description = "Worksite returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "worksites"
)]
pub async fn get_worksite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let worksite = state
        .services
        .worksite
        .get_worksite(id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(worksite))
}

/// Update a worksite
#[utoipa::path(
    put,
    path = "/api/v1/worksites/{id}",
    params(("id" = Uuid, Path, description = "Worksite id")),
    request_body = UpdateWorksiteInput,
    responses(
        (status = 200, description = "Worksite updated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "worksites"
)]
pub async fn update_worksite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorksiteInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let scope = tenant_scope(&user)?;
    let worksite = state
        .services
        .worksite
        .update_worksite(id, scope, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(worksite))
}

/// Delete an empty worksite
#[utoipa::path(
    delete,
    path = "/api/v1/worksites/{id}",
    params(("id" = Uuid, Path, description = "Worksite id")),
    responses(
        (status = 204, description = "Worksite deleted"),
        (status = 400, description = "Worksite still in use", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "worksites"
)]
pub async fn delete_worksite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    state
        .services
        .worksite
        .delete_worksite(id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
