use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use moviesnacks_api::{
    build_router,
    config::AppConfig,
    db,
    entities::food_item,
    events::{self, EventSender},
    services::catalog::FoodItemInput,
    AppState,
};

pub const OWNER_PASSWORD: &str = "owner-password";

/// Helper harness for spinning up an application backed by a throwaway
/// SQLite database file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    db_file: PathBuf,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // Unique file per test; a shared in-memory SQLite database does
        // not survive a connection pool.
        let db_file = std::env::temp_dir().join(format!(
            "moviesnacks_test_{}.db",
            Uuid::new_v4().simple()
        ));

        let cfg = AppConfig {
            database_url: format!("sqlite://{}?mode=rwc", db_file.display()),
            host: "127.0.0.1".to_string(),
            port: 18_080,
            environment: "test".to_string(),
            log_level: "warn".to_string(),
            log_json: false,
            auto_migrate: true,
            jwt_secret: "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            jwt_expiration_secs: 3600,
            auth_issuer: "moviesnacks-api".to_string(),
            auth_audience: "moviesnacks-staff".to_string(),
            admin_username: "owner".to_string(),
            admin_password_sha256: hex::encode(Sha256::digest(OWNER_PASSWORD.as_bytes())),
            page_size: 20,
            cors_allowed_origins: None,
        };

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), Arc::new(cfg), event_sender);
        let token = state
            .auth
            .issue_token("owner", true)
            .expect("failed to issue test token");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            token,
            db_file,
            _event_task: event_task,
        }
    }

    /// Bearer token for the provisioned owner account.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request against the router with arbitrary extra headers.
    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        json_body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request_body = if let Some(json) = json_body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(request_body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Plain unauthenticated request.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        json_body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, json_body, &[]).await
    }

    /// Request carrying a session id, for the cart and order endpoints.
    pub async fn session_request(
        &self,
        method: Method,
        uri: &str,
        session_id: &str,
        json_body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, json_body, &[("x-session-id", session_id)])
            .await
    }

    /// Request authenticated as the owner, for the staff endpoints.
    pub async fn staff_request(
        &self,
        method: Method,
        uri: &str,
        json_body: Option<Value>,
    ) -> axum::response::Response {
        let auth = format!("Bearer {}", self.token);
        self.request_with_headers(method, uri, json_body, &[("authorization", &auth)])
            .await
    }

    /// Seeds one catalog item directly through the service layer.
    pub async fn seed_food_item(
        &self,
        name: &str,
        price: Decimal,
        available: bool,
    ) -> food_item::Model {
        self.state
            .services
            .catalog
            .create(FoodItemInput {
                name: name.to_string(),
                description: format!("{} seeded for integration tests", name),
                price,
                available,
            })
            .await
            .expect("seed food item for tests")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        let _ = std::fs::remove_file(&self.db_file);
    }
}

/// Reads a response body as JSON.
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body as json")
}

/// Parses a decimal field that rust_decimal serialized as a JSON string.
pub fn decimal_field(value: &Value, field: &str) -> Decimal {
    value[field]
        .as_str()
        .unwrap_or_else(|| panic!("missing decimal field {}", field))
        .parse()
        .expect("parse decimal field")
}
