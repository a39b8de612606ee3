//! MovieSnacks API Library
//!
//! In-seat food ordering for a movie theatre: a public menu, per-session
//! carts, atomic order placement, and a staff surface for order and
//! catalog administration.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod cart;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{AuthService, StaffRouterExt};
use crate::cart::SessionCartStore;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub carts: Arc<SessionCartStore>,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
    pub event_sender: events::EventSender,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: Arc<config::AppConfig>,
        event_sender: events::EventSender,
    ) -> Self {
        let carts = Arc::new(SessionCartStore::new());
        let services = handlers::AppServices::new(
            db.clone(),
            carts.clone(),
            event_sender.clone(),
            config.page_size,
        );
        let auth = Arc::new(AuthService::from_app_config(&config));
        Self {
            db,
            config,
            carts,
            services,
            auth,
            event_sender,
        }
    }
}

// Common response wrapper for the status endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Versioned API surface. The staff subtree carries the superuser gate;
/// everything else is open to customers.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/menu", handlers::menu::menu_routes())
        .nest("/cart", handlers::carts::cart_routes())
        .nest("/orders", handlers::orders::order_routes())
        .nest("/staff", handlers::staff::staff_routes().with_superuser())
}

/// The complete application router, shared by the binary and the tests.
pub fn build_router(state: AppState) -> Router {
    let auth = state.auth.clone();
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
        .nest("/auth", auth::auth_routes().with_state(auth.clone()))
        .layer(Extension(auth))
}

async fn api_status() -> Json<ApiResponse<Value>> {
    let status_data = json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    });
    Json(ApiResponse::success(status_data))
}

async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "services": {
            "database": db_status,
        },
    });
    Json(ApiResponse::success(health_data))
}
