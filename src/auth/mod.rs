/*!
 * # Authentication and Authorization Module
 *
 * JWT-based authentication with refresh token support, plus role-based
 * access control. Permissions are derived from the account role at
 * token-issue time, so a token carries everything the permission
 * middleware needs without a database round trip.
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::entities::user::{self, UserRole};

pub mod permissions;

pub use permissions::{consts, role_permissions};

const TOKEN_KIND_ACCESS: &str = "access";
const TOKEN_KIND_REFRESH: &str = "refresh";

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,              // Subject (user ID)
    pub name: Option<String>,     // User's name
    pub email: Option<String>,    // User's email
    pub role: UserRole,           // Account role
    pub permissions: Vec<String>, // Permissions derived from the role
    pub tenant_id: Option<Uuid>,  // Contractor tenant the account is scoped to
    pub kind: String,             // "access" or "refresh"
    pub jti: String,              // JWT ID (unique identifier for this token)
    pub iat: i64,                 // Issued at time
    pub exp: i64,                 // Expiration time
    pub nbf: i64,                 // Not valid before time
    pub iss: String,              // Issuer
    pub aud: String,              // Audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: UserRole,
    pub permissions: Vec<String>,
    pub tenant_id: Option<Uuid>,
    pub token_id: String,
}

impl AuthUser {
    /// Check if the user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_str() == role
    }

    /// Check if the user has a specific permission
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Check if the user is an admin
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Tenant filter this account is allowed to see. Admin and warehouse
    /// accounts are unscoped; contractor and principal accounts must carry
    /// a tenant id in their token.
    pub fn tenant_scope(&self) -> Result<Option<Uuid>, AuthError> {
        match self.role {
            UserRole::Admin | UserRole::Warehouse => Ok(None),
            UserRole::Contractor | UserRole::Principal => {
                self.tenant_id.map(Some).ok_or(AuthError::MissingTenant)
            }
        }
    }
}

#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
        refresh_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
            refresh_token_expiration,
        }
    }

    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_audience: config.auth_audience.clone(),
            jwt_issuer: config.auth_issuer.clone(),
            access_token_expiration: Duration::from_secs(config.jwt_expiration),
            refresh_token_expiration: Duration::from_secs(config.refresh_token_expiration),
        }
    }
}

/// Authentication service that handles account management, token issuance
/// and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
    blacklisted_tokens: Arc<RwLock<Vec<BlacklistedToken>>>,
}

/// Token blacklist entry
#[derive(Clone, Debug)]
struct BlacklistedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

/// Input for account creation
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            blacklisted_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create an account. Contractor accounts with no explicit tenant
    /// become the owner of a fresh tenant keyed by their own id.
    pub async fn create_user(&self, input: NewUser) -> Result<user::Model, AuthError> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(input.email.clone()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let id = Uuid::new_v4();
        let tenant_id = match (input.role, input.tenant_id) {
            (UserRole::Contractor, None) => Some(id),
            (UserRole::Admin | UserRole::Warehouse, _) => None,
            (_, tenant) => tenant,
        };
        if input.role == UserRole::Principal && tenant_id.is_none() {
            return Err(AuthError::MissingTenant);
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(id),
            email: Set(input.email),
            name: Set(input.name),
            password_hash: Set(hash_password(&input.password)?),
            role: Set(input.role),
            tenant_id: Set(tenant_id),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user::Entity::insert(model)
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }

    /// Verify credentials against the users table
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<user::Model, AuthError> {
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.active {
            return Err(AuthError::InvalidCredentials);
        }

        verify_password(password, &account.password_hash)?;
        Ok(account)
    }

    /// Generate an access/refresh token pair for a user
    pub async fn generate_token(&self, account: &user::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("invalid token duration".to_string()))?;
        let refresh_exp = now
            + ChronoDuration::from_std(self.config.refresh_token_expiration)
                .map_err(|_| AuthError::InternalError("invalid token duration".to_string()))?;

        let access_jti = Uuid::new_v4().to_string();
        let refresh_jti = Uuid::new_v4().to_string();

        let access_claims = Claims {
            sub: account.id.to_string(),
            name: Some(account.name.clone()),
            email: Some(account.email.clone()),
            role: account.role,
            permissions: role_permissions(account.role),
            tenant_id: account.tenant_id,
            kind: TOKEN_KIND_ACCESS.to_string(),
            jti: access_jti,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        // Refresh tokens carry minimal data; the user is re-read from the
        // database on refresh so role changes take effect.
        let refresh_claims = Claims {
            sub: account.id.to_string(),
            name: None,
            email: None,
            role: account.role,
            permissions: vec![],
            tenant_id: account.tenant_id,
            kind: TOKEN_KIND_REFRESH.to_string(),
            jti: refresh_jti,
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = self.encode_claims(&access_claims)?;
        let refresh_token = self.encode_claims(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            refresh_expires_in: self.config.refresh_token_expiration.as_secs() as i64,
        })
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and extract the claims
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.clone()]);
        validation.set_issuer(&[self.config.jwt_issuer.clone()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_token_blacklisted(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Validate an access token specifically
    pub async fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate_token(token).await?;
        if claims.kind != TOKEN_KIND_ACCESS {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.validate_token(refresh_token).await?;
        if claims.kind != TOKEN_KIND_REFRESH {
            return Err(AuthError::InvalidToken);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        let account = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        if !account.active {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.generate_token(&account).await?;

        // The spent refresh token cannot be replayed
        self.blacklist(claims.jti, claims.exp).await;
        debug!(user_id = %account.id, "refresh token rotated");

        Ok(tokens)
    }

    /// Revoke a token (add it to the blacklist)
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.validate_token(token).await?;
        self.blacklist(claims.jti, claims.exp).await;
        Ok(())
    }

    async fn blacklist(&self, jti: String, exp: i64) {
        let expiry = DateTime::from_timestamp(exp, 0).unwrap_or_else(Utc::now);
        let mut blacklist = self.blacklisted_tokens.write().await;
        blacklist.push(BlacklistedToken { jti, expiry });
        let now = Utc::now();
        blacklist.retain(|t| t.expiry > now);
    }

    async fn is_token_blacklisted(&self, token_id: &str) -> bool {
        let blacklist = self.blacklisted_tokens.read().await;
        blacklist.iter().any(|t| t.jti == token_id)
    }
}

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::InternalError(e.to_string()))
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::InternalError(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Token pair response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}

/// Login credentials
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Email address already registered")]
    EmailTaken,

    #[error("Account is not linked to a tenant")]
    MissingTenant,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Authentication token has been revoked".to_string(),
            ),
            Self::TokenCreation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                msg.clone(),
            ),
            Self::EmailTaken => (
                StatusCode::CONFLICT,
                "AUTH_EMAIL_TAKEN",
                "Email address already registered".to_string(),
            ),
            Self::MissingTenant => (
                StatusCode::FORBIDDEN,
                "AUTH_MISSING_TENANT",
                "Account is not linked to a tenant".to_string(),
            ),
            Self::UserNotFound => (
                StatusCode::NOT_FOUND,
                "AUTH_USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_DATABASE_ERROR",
                "Internal authentication error".to_string(),
            ),
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal authentication error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Permission middleware to check if a user has the required permission
pub async fn permission_middleware(
    State(required_permission): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    // Admins have all permissions
    if user.is_admin() {
        return Ok(next.run(request).await);
    }

    if !user.has_permission(&required_permission) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Role middleware to check if a user has the required role
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match request.extensions().get::<AuthUser>() {
        Some(user) => user.clone(),
        None => return Err(AuthError::MissingAuth),
    };

    if !user.has_role(&required_role) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extract authentication info from request headers
async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if auth_value.starts_with("Bearer ") {
                let token = auth_value.trim_start_matches("Bearer ").trim();
                let claims = auth_service.validate_access_token(token).await?;

                let user_id =
                    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

                return Ok(AuthUser {
                    user_id,
                    name: claims.name,
                    email: claims.email,
                    role: claims.role,
                    permissions: claims.permissions,
                    tenant_id: claims.tenant_id,
                    token_id: claims.jti,
                });
            }
        }
    }

    Err(AuthError::MissingAuth)
}

/// Authentication routes
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new()
        .route("/login", axum::routing::post(login_handler))
        .route("/refresh", axum::routing::post(refresh_token_handler))
        .route("/logout", axum::routing::post(logout_handler))
        .route("/me", axum::routing::get(me_handler))
        .layer(DefaultBodyLimit::max(1024 * 64))
}

/// Login handler
pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<TokenPair>, AuthError> {
    let account = auth_service
        .authenticate(&credentials.email, &credentials.password)
        .await?;
    let token_pair = auth_service.generate_token(&account).await?;
    Ok(Json(token_pair))
}

/// Refresh token handler
pub async fn refresh_token_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(refresh_request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let token_pair = auth_service
        .refresh_token(&refresh_request.refresh_token)
        .await?;
    Ok(Json(token_pair))
}

/// Logout handler, revokes the presented access token
async fn logout_handler(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if auth_value.starts_with("Bearer ") {
                let token = auth_value.trim_start_matches("Bearer ").trim();
                auth_service.revoke_token(token).await?;
                return Ok(Json(
                    serde_json::json!({ "message": "Successfully logged out" }),
                ));
            }
        }
    }

    Err(AuthError::MissingAuth)
}

/// Returns the authenticated user's identity and permissions
async fn me_handler(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, permission: &str) -> Self;
    fn with_role(self, role: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, permission: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            permission.to_string(),
            permission_middleware,
        ))
        .with_auth()
    }

    fn with_role(self, role: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(role: UserRole, tenant: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            name: None,
            email: None,
            role,
            permissions: role_permissions(role),
            tenant_id: tenant,
            token_id: "t1".to_string(),
        }
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn auth_config_copies_expirations_from_app_config() {
        let cfg = crate::config::AppConfig::new(
            "sqlite::memory:".to_string(),
            "a-test-secret-that-is-long-enough-for-the-validator-0123456789ab".to_string(),
            3600,
            86_400,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        let auth = AuthConfig::from_app_config(&cfg);
        assert_eq!(auth.access_token_expiration, Duration::from_secs(3600));
        assert_eq!(auth.refresh_token_expiration, Duration::from_secs(86_400));
    }

    #[test]
    fn tenant_scope_per_role() {
        let tenant = Uuid::new_v4();
        assert_eq!(
            auth_user(UserRole::Contractor, Some(tenant))
                .tenant_scope()
                .unwrap(),
            Some(tenant)
        );
        assert_eq!(auth_user(UserRole::Admin, None).tenant_scope().unwrap(), None);
        assert_eq!(
            auth_user(UserRole::Warehouse, None).tenant_scope().unwrap(),
            None
        );
        assert!(auth_user(UserRole::Principal, None).tenant_scope().is_err());
    }

    #[test]
    fn admin_detection() {
        assert!(auth_user(UserRole::Admin, None).is_admin());
        assert!(!auth_user(UserRole::Contractor, Some(Uuid::new_v4())).is_admin());
    }

    #[tokio::test]
    async fn token_round_trip_and_kind_checks() {
        let config = AuthConfig::new(
            "a-test-secret-that-is-long-enough-for-the-validator-0123456789ab".to_string(),
            "safegear-clients".to_string(),
            "safegear-api".to_string(),
            Duration::from_secs(900),
            Duration::from_secs(86_400),
        );
        let db = Arc::new(
            sea_orm::Database::connect("sqlite::memory:")
                .await
                .unwrap(),
        );
        let service = AuthService::new(config, db);

        let account = user::Model {
            id: Uuid::new_v4(),
            email: "worker@example.com".to_string(),
            name: "Worker".to_string(),
            password_hash: String::new(),
            role: UserRole::Contractor,
            tenant_id: Some(Uuid::new_v4()),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let pair = service.generate_token(&account).await.unwrap();
        let claims = service.validate_access_token(&pair.access_token).await.unwrap();
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.role, UserRole::Contractor);
        assert!(claims
            .permissions
            .contains(&consts::EQUIPMENT_ASSIGN.to_string()));

        // A refresh token is not accepted where an access token is required
        assert!(service
            .validate_access_token(&pair.refresh_token)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let config = AuthConfig::new(
            "a-test-secret-that-is-long-enough-for-the-validator-0123456789ab".to_string(),
            "safegear-clients".to_string(),
            "safegear-api".to_string(),
            Duration::from_secs(900),
            Duration::from_secs(86_400),
        );
        let db = Arc::new(
            sea_orm::Database::connect("sqlite::memory:")
                .await
                .unwrap(),
        );
        let service = AuthService::new(config, db);

        let account = user::Model {
            id: Uuid::new_v4(),
            email: "worker@example.com".to_string(),
            name: "Worker".to_string(),
            password_hash: String::new(),
            role: UserRole::Admin,
            tenant_id: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let pair = service.generate_token(&account).await.unwrap();
        service.revoke_token(&pair.access_token).await.unwrap();
        assert!(matches!(
            service.validate_token(&pair.access_token).await,
            Err(AuthError::RevokedToken)
        ));
    }
}
