use crate::handlers::common::{
    created_response, map_service_error, required_tenant, success_response, tenant_scope,
    validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    entities::incident_report::IncidentStatus,
    errors::ApiError,
    services::incidents::{CreateIncidentInput, UpdateIncidentInput, UpsertStepInput},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::put,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::AuthUser;

/// Creates the router for incident review endpoints
pub fn incidents_review_routes() -> Router<Arc<AppState>> {
    Router::new().route("/:id/status", put(update_status))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct IncidentListQuery {
    pub status: Option<IncidentStatus>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
}

/// Create a draft incident report
#[utoipa::path(
    post,
    path = "/api/v1/incidents",
    request_body = CreateIncidentInput,
    responses(
        (status = 201, description = "Report created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn create_incident(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateIncidentInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let tenant_id = required_tenant(&user)?;
    let incident = state
        .services
        .incident
        .create_incident(tenant_id, user.user_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(incident))
}

/// List incident reports
#[utoipa::path(
    get,
    path = "/api/v1/incidents",
    params(IncidentListQuery),
    responses((status = 200, description = "Report list returned")),
    tag = "incidents"
)]
pub async fn list_incidents(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<IncidentListQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let pagination = PaginationParams {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    let (incidents, total) = state
        .services
        .incident
        .list_incidents(scope, query.status, pagination.page, pagination.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(PaginatedResponse::new(
        incidents,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get a report with its analysis steps
#[utoipa::path(
    get,
    path = "/api/v1/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Report returned", body = crate::services::incidents::IncidentDetail),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn get_incident(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let detail = state
        .services
        .incident
        .get_incident(id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

/// Update a draft report
#[utoipa::path(
    put,
    path = "/api/v1/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident id")),
    request_body = UpdateIncidentInput,
    responses(
        (status = 200, description = "Report updated"),
        (status = 400, description = "Report is no longer editable", body = crate::errors::ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn update_incident(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIncidentInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let scope = tenant_scope(&user)?;
    let incident = state
        .services
        .incident
        .update_incident(id, scope, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(incident))
}

/// Save an analysis step (steps complete in order)
#[utoipa::path(
    put,
    path = "/api/v1/incidents/{id}/steps",
    params(("id" = Uuid, Path, description = "Incident id")),
    request_body = UpsertStepInput,
    responses(
        (status = 200, description = "Step saved"),
        (status = 400, description = "Earlier steps incomplete", body = crate::errors::ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn upsert_step(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertStepInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let scope = tenant_scope(&user)?;
    let step = state
        .services
        .incident
        .upsert_step(id, scope, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(step))
}

/// Submit a complete report for review
#[utoipa::path(
    post,
    path = "/api/v1/incidents/{id}/submit",
    params(("id" = Uuid, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Report submitted"),
        (status = 400, description = "Steps incomplete", body = crate::errors::ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn submit_incident(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let scope = tenant_scope(&user)?;
    let incident = state
        .services
        .incident
        .submit(id, scope)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(incident))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewStatusRequest {
    pub status: IncidentStatus,
}

/// Review transition (Submitted to UnderReview to Closed)
#[utoipa::path(
    put,
    path = "/api/v1/admin/incidents/{id}/status",
    params(("id" = Uuid, Path, description = "Incident id")),
    request_body = ReviewStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid transition", body = crate::errors::ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let incident = state
        .services
        .incident
        .update_status(id, payload.status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(incident))
}
