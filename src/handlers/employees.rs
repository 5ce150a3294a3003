use crate::handlers::common::{
    created_response, map_service_error, no_content_response, required_tenant, success_response,
    tenant_scope, validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    errors::ApiError,
    services::employees::{CreateEmployeeInput, UpdateEmployeeInput},
    AppState,
};
use axum::extract::{Json, Path, Query, State};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeListQuery {
    pub worksite_id: Option<Uuid>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
}

/// Create an employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeInput,
    responses(
        (status = 201, description = "Employee created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "employees"
)]
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateEmployeeInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let tenant_id = required_tenant(&user)?;
    let employee = state
        .services
        .employee
        .create_employee(tenant_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(employee))
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeListQuery),
    responses((status = 200, description = "Employee list returned")),
    tag = "employees"
)]
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<EmployeeListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let pagination = PaginationParams {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    let (employees, total) = state
        .services
        .employee
        .list_employees(scope, query.worksite_id, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        employees,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get an employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "employees"
)]
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let employee = state
        .services
        .employee
        .get_employee(id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(employee))
}

/// Update an employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    request_body = UpdateEmployeeInput,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "employees"
)]
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let scope = tenant_scope(&user)?;
    let employee = state
        .services
        .employee
        .update_employee(id, scope, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(employee))
}

/// Delete an employee, restoring availability of assigned equipment
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "employees"
)]
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    state
        .services
        .employee
        .delete_employee(id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
