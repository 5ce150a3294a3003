use crate::auth::AuthUser;
use crate::errors::{ApiError, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// The tenant filter for this request. Admin and warehouse accounts see
/// everything; contractor and principal accounts see their tenant only.
pub fn tenant_scope(user: &AuthUser) -> Result<Option<Uuid>, ApiError> {
    user.tenant_scope().map_err(|_| ApiError::Unauthorized)
}

/// The tenant a write must land in. Unscoped roles cannot use endpoints
/// that require an owning tenant.
pub fn required_tenant(user: &AuthUser) -> Result<Uuid, ApiError> {
    tenant_scope(user)?.ok_or_else(|| ApiError::BadRequest {
        message: "This operation requires a tenant-scoped account".to_string(),
    })
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Calculate zero-based offset for pagination
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.per_page
    }
}

/// Standard pagination response metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        // The query layer clamps page sizes to at least one row; the
        // metadata mirrors that so total_pages never divides by zero.
        let per_page = per_page.max(1);
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::role_permissions;
    use crate::entities::user::UserRole;

    fn user(role: UserRole, tenant: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            name: None,
            email: None,
            role,
            permissions: role_permissions(role),
            tenant_id: tenant,
            token_id: "t".to_string(),
        }
    }

    #[test]
    fn pagination_offset() {
        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.offset(), 40);
        assert_eq!(PaginationParams::default().offset(), 0);
    }

    #[test]
    fn pagination_meta_rounds_up() {
        let meta = PaginationMeta::new(1, 20, 41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(PaginationMeta::new(1, 20, 0).total_pages, 0);
    }

    #[test]
    fn pagination_meta_clamps_zero_per_page() {
        let meta = PaginationMeta::new(1, 0, 5);
        assert_eq!(meta.per_page, 1);
        assert_eq!(meta.total_pages, 5);
    }

    #[test]
    fn required_tenant_rejects_unscoped_roles() {
        let tenant = Uuid::new_v4();
        assert_eq!(
            required_tenant(&user(UserRole::Contractor, Some(tenant))).unwrap(),
            tenant
        );
        assert!(required_tenant(&user(UserRole::Warehouse, None)).is_err());
    }
}
