use crate::handlers::common::{
    created_response, map_service_error, success_response, tenant_scope, validate_input,
};
use crate::{errors::ApiError, services::equipment::AssignEquipmentInput, AppState};
use axum::extract::{Json, Path, State};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthUser;

/// Assign one unit from each batch to an employee
#[utoipa::path(
    post,
    path = "/api/v1/equipment/employees/{employee_id}/assignments",
    params(("employee_id" = Uuid, Path, description = "Employee id")),
    request_body = AssignEquipmentInput,
    responses(
        (status = 201, description = "Assignments created"),
        (status = 422, description = "A batch has no available units", body = crate::errors::ErrorResponse),
        (status = 404, description = "Employee or batch not found", body = crate::errors::ErrorResponse)
    ),
    tag = "equipment"
)]
pub async fn assign(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<AssignEquipmentInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let scope = tenant_scope(&user)?;
    let assignments = state
        .services
        .equipment
        .assign(scope, employee_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(assignments))
}

/// Return an assigned unit to its batch
#[utoipa::path(
    post,
    path = "/api/v1/equipment/assignments/{assignment_id}/return",
    params(("assignment_id" = Uuid, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment closed"),
        (status = 400, description = "Already returned", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "equipment"
)]
pub async fn unassign(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let assignment = state
        .services
        .equipment
        .unassign(scope, assignment_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(assignment))
}

/// An employee's active equipment with use-life dates
#[utoipa::path(
    get,
    path = "/api/v1/equipment/employees/{employee_id}/equipment",
    params(("employee_id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Equipment list returned", body = Vec<crate::services::equipment::EquipmentView>),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    tag = "equipment"
)]
pub async fn employee_equipment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(employee_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let equipment = state
        .services
        .equipment
        .employee_equipment(scope, employee_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(equipment))
}
