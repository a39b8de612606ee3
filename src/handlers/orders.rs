use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    handlers::common::SessionId,
    services::orders::{OrderWithItems, PlaceOrderRequest},
    AppState,
};

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order))
        .route("/{id}", get(get_order))
}

/// Submits the session's cart as an order. Succeeds atomically or not at
/// all; on success the cart is gone and the persisted order is returned.
async fn place_order(
    State(state): State<AppState>,
    session: SessionId,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>), ServiceError> {
    let order = state
        .services
        .orders
        .place_order(session.as_str(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithItems>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(order))
}
