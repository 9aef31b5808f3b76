use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use kitstudio_api::{
    app_router,
    auth::{AuthService, AuthUser},
    config::AppConfig,
    db,
    entities::{complexity_level, service_addon, service_type},
    events::{self, EventSender},
    handlers::AppServices,
    models::Role,
    services::catalog::{CreateAddon, CreateComplexityLevel, CreateServiceType},
    AppState,
};

/// Helper harness for spinning up the application against a throwaway
/// SQLite database. Each instance owns its own database file, so tests can
/// run in parallel.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin_id: Uuid,
    pub client_id: Uuid,
    admin_token: String,
    client_token: String,
    pub auth_service: Arc<AuthService>,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        database_url,
        jwt_secret: "test_secret_key_for_testing_purposes_only_32chars".into(),
        jwt_expiration: 3600,
        auth_issuer: "kitstudio-auth".into(),
        auth_audience: "kitstudio-api".into(),
        allow_dev_tokens: true,
        host: "127.0.0.1".into(),
        port: 18_080,
        environment: "test".into(),
        log_level: "info".into(),
        log_json: false,
        auto_migrate: true,
        currency: "IDR".into(),
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        cors_allow_credentials: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 30,
        db_idle_timeout_secs: 600,
        db_acquire_timeout_secs: 8,
        event_channel_capacity: 256,
    }
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir for test database");
        let db_path = db_dir.path().join("kitstudio_test.db");
        let cfg = test_config(format!("sqlite://{}?mode=rwc", db_path.display()));

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));
        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            event_sender,
            services,
        };

        let auth_service = Arc::new(AuthService::from_app_config(&cfg));
        let router = app_router(state.clone(), auth_service.clone(), CorsLayer::permissive());

        let admin_id = Uuid::new_v4();
        let client_id = Uuid::new_v4();
        let admin_token = auth_service
            .generate_token(
                admin_id,
                Role::Admin,
                Some("Studio Admin".into()),
                Some("admin@example.com".into()),
            )
            .expect("encode admin token");
        let client_token = auth_service
            .generate_token(
                client_id,
                Role::Client,
                Some("Test Client".into()),
                Some("client@example.com".into()),
            )
            .expect("encode client token");

        let app = Self {
            router,
            state,
            admin_id,
            client_id,
            admin_token,
            client_token,
            auth_service,
            _db_dir: db_dir,
            _event_task: event_task,
        };

        // Seed the two profiles so ownership checks have rows to point at.
        app.seed_profile(admin_id, Role::Admin, "Studio Admin", "admin@example.com")
            .await;
        app.seed_profile(client_id, Role::Client, "Test Client", "client@example.com")
            .await;

        app
    }

    async fn seed_profile(&self, id: Uuid, role: Role, name: &str, email: &str) {
        let user = AuthUser {
            user_id: id,
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            role,
        };
        self.state
            .services
            .profiles
            .ensure_profile(&user)
            .await
            .expect("seed profile");
    }

    #[allow(dead_code)]
    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    #[allow(dead_code)]
    pub fn client_token(&self) -> &str {
        &self.client_token
    }

    /// Send a request against the router with an optional bearer token.
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
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for admin-authenticated JSON requests.
    pub async fn admin(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(&self.admin_token))
            .await
    }

    /// Convenience helper for client-authenticated JSON requests.
    #[allow(dead_code)]
    pub async fn client(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(&self.client_token))
            .await
    }

    // ---- catalog seed helpers ----

    #[allow(dead_code)]
    pub async fn seed_service(
        &self,
        name: &str,
        base_price_cents: i64,
        base_days: i32,
    ) -> service_type::Model {
        self.state
            .services
            .catalog
            .create_service(CreateServiceType {
                name: name.to_string(),
                description: None,
                base_price_cents,
                base_days,
                icon: None,
                sort_order: 0,
            })
            .await
            .expect("seed service")
    }

    #[allow(dead_code)]
    pub async fn seed_complexity(
        &self,
        name: &str,
        slug: &str,
        multiplier: Decimal,
    ) -> complexity_level::Model {
        self.state
            .services
            .catalog
            .create_complexity_level(CreateComplexityLevel {
                name: name.to_string(),
                slug: slug.to_string(),
                multiplier,
                sort_order: 0,
            })
            .await
            .expect("seed complexity level")
    }

    #[allow(dead_code)]
    pub async fn seed_addon(
        &self,
        service_id: Uuid,
        name: &str,
        price_cents: i64,
        required: bool,
    ) -> service_addon::Model {
        self.state
            .services
            .catalog
            .create_addon(
                service_id,
                CreateAddon {
                    name: name.to_string(),
                    price_cents,
                    required,
                    sort_order: 0,
                },
            )
            .await
            .expect("seed add-on")
    }

    #[allow(dead_code)]
    pub async fn seed_override(&self, service_id: Uuid, complexity_id: Uuid, multiplier: Decimal) {
        self.state
            .services
            .catalog
            .set_override(service_id, complexity_id, Some(multiplier))
            .await
            .expect("seed override");
    }
}

/// Reads a JSON body out of a response.
#[allow(dead_code)]
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
