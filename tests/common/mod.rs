use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    middleware, Router,
};
use rust_decimal::Decimal;
use safegear_api::{
    auth::{AuthConfig, AuthService, NewUser},
    config::AppConfig,
    db,
    entities::user::UserRole,
    events::{self, EventSender},
    handlers::AppServices,
    services::catalog::{CreateProductInput, LeadTimeTierInput, PriceTierInput},
    AppState,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Test harness wrapping the full application router backed by an
/// in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    pub auth: Arc<AuthService>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            86_400,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single pooled connection keeps every query on the same
        // in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx, None));

        let auth_cfg = AuthConfig::from_app_config(&cfg);
        let auth = Arc::new(AuthService::new(auth_cfg, db_arc.clone()));

        let services = AppServices::new(db_arc.clone(), event_sender.clone(), &cfg);

        let state = Arc::new(AppState {
            db: db_arc,
            config: Arc::new(cfg),
            event_sender,
            services,
            auth: auth.clone(),
        });

        let auth_for_layer = auth.clone();
        let router = Router::new()
            .nest("/api/v1", safegear_api::api_v1_routes())
            .nest(
                "/api/v1/auth",
                safegear_api::auth::auth_routes().with_state(auth.clone()),
            )
            .layer(middleware::from_fn_with_state(
                auth_for_layer,
                |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
                 mut req: Request<Body>,
                 next: axum::middleware::Next| async move {
                    req.extensions_mut().insert(auth);
                    next.run(req).await
                },
            ))
            .with_state(state.clone());

        Self {
            router,
            state,
            auth,
            _event_task: event_task,
        }
    }

    /// Creates a user with the given role and returns its id, tenant
    /// scope and a bearer token.
    pub async fn user_with_role(
        &self,
        role: UserRole,
        tenant_id: Option<Uuid>,
    ) -> (Uuid, Option<Uuid>, String) {
        let suffix = Uuid::new_v4().simple().to_string();
        let user = self
            .auth
            .create_user(NewUser {
                email: format!("{}-{}@example.com", role_slug(role), suffix),
                name: format!("Test {}", role_slug(role)),
                password: "correct horse battery staple".to_string(),
                role,
                tenant_id,
            })
            .await
            .expect("create test user");
        let tokens = self
            .auth
            .generate_token(&user)
            .await
            .expect("issue test token");
        (user.id, user.tenant_id, tokens.access_token)
    }

    /// Convenience: a contractor with a fresh tenant of its own.
    pub async fn contractor(&self) -> (Uuid, Uuid, String) {
        let (user_id, tenant, token) = self.user_with_role(UserRole::Contractor, None).await;
        (user_id, tenant.expect("contractor has tenant"), token)
    }

    pub async fn admin(&self) -> (Uuid, String) {
        let (user_id, _, token) = self.user_with_role(UserRole::Admin, None).await;
        (user_id, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("serialize request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seeds an active catalog product with one price tier per entry of
    /// `price_tiers` and a single wide lead-time tier.
    pub async fn seed_product(
        &self,
        sku: &str,
        price_tiers: &[(i32, i32, Decimal)],
    ) -> safegear_api::services::catalog::ProductDetail {
        self.state
            .services
            .catalog
            .create_product(CreateProductInput {
                sku: sku.to_string(),
                name: format!("Test Product {}", sku),
                description: "Seeded for integration tests".to_string(),
                category: "gloves".to_string(),
                brand: "SafeGear".to_string(),
                use_life_months: 6,
                status: Some(safegear_api::entities::product::ProductStatus::Active),
                price_tiers: price_tiers
                    .iter()
                    .map(|(min, max, price)| PriceTierInput {
                        min_quantity: *min,
                        max_quantity: *max,
                        unit_price: *price,
                    })
                    .collect(),
                lead_time_tiers: vec![LeadTimeTierInput {
                    min_quantity: 1,
                    max_quantity: 1_000,
                    days: 5,
                }],
            })
            .await
            .expect("seed product")
    }
}

fn role_slug(role: UserRole) -> &'static str {
    match role {
        UserRole::Contractor => "contractor",
        UserRole::Admin => "admin",
        UserRole::Warehouse => "warehouse",
        UserRole::Principal => "principal",
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Reads a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}
