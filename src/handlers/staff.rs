use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    entities::{
        food_item,
        order::{self, PaymentMethod, PaymentStatus},
    },
    errors::ServiceError,
    services::{
        catalog::FoodItemInput,
        orders::{DateWindow, OrderListFilter, OrderPage, OrderWithItems},
        reports::DashboardSummary,
    },
    AppState,
};

/// Staff-only surface. The superuser gate is layered on by the caller.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/payment-status", put(update_payment_status))
        .route("/food-items", get(list_food_items))
        .route("/food-items", post(create_food_item))
        .route("/food-items/{id}", put(update_food_item))
        .route("/food-items/{id}", delete(delete_food_item))
        .route("/food-items/{id}/toggle", post(toggle_food_item))
        .route("/dashboard", get(dashboard))
}

#[derive(Debug, Default, Deserialize)]
struct OrderListQuery {
    status: Option<PaymentStatus>,
    payment_method: Option<PaymentMethod>,
    date_window: Option<DateWindow>,
    search: Option<String>,
    page: Option<u64>,
}

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderPage>, ServiceError> {
    let filter = OrderListFilter {
        status: query.status,
        payment_method: query.payment_method,
        date_window: query.date_window,
        search: query.search,
    };
    let page = state
        .services
        .orders
        .list_orders(filter, query.page.unwrap_or(1).max(1))
        .await?;
    Ok(Json(page))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithItems>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
struct UpdatePaymentStatusRequest {
    payment_status: PaymentStatus,
}

async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<order::Model>, ServiceError> {
    let order = state
        .services
        .orders
        .update_payment_status(id, payload.payment_status)
        .await?;
    Ok(Json(order))
}

/// Every item regardless of availability.
async fn list_food_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<food_item::Model>>, ServiceError> {
    let items = state.services.catalog.list_all().await?;
    Ok(Json(items))
}

async fn create_food_item(
    State(state): State<AppState>,
    Json(payload): Json<FoodItemInput>,
) -> Result<(StatusCode, Json<food_item::Model>), ServiceError> {
    let item = state.services.catalog.create(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_food_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<FoodItemInput>,
) -> Result<Json<food_item::Model>, ServiceError> {
    let item = state.services.catalog.update(id, payload).await?;
    Ok(Json(item))
}

async fn delete_food_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_food_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<food_item::Model>, ServiceError> {
    let item = state.services.catalog.toggle_availability(id).await?;
    Ok(Json(item))
}

async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, ServiceError> {
    let summary = state.services.reports.dashboard().await?;
    Ok(Json(summary))
}
