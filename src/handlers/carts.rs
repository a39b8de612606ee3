use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    errors::{ApiError, ServiceError},
    handlers::common::SessionId,
    services::cart::CartView,
    AppState,
};

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/items", post(add_item))
        .route("/items/{item_id}", put(update_item))
        .route("/items/{item_id}", delete(remove_item))
        .route("/clear", post(clear_cart))
}

#[derive(Debug, Deserialize, Validate)]
struct AddItemRequest {
    food_item_id: i64,
    #[validate(range(min = 1, max = 10, message = "Quantity must be between 1 and 10."))]
    quantity: u32,
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateItemRequest {
    #[validate(range(max = 10, message = "Quantity must be between 0 and 10."))]
    quantity: u32,
}

async fn view_cart(State(state): State<AppState>, session: SessionId) -> Json<CartView> {
    Json(state.services.cart.view(session.as_str()))
}

async fn add_item(
    State(state): State<AppState>,
    session: SessionId,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    payload.validate().map_err(ServiceError::from)?;
    let view = state
        .services
        .cart
        .add_item(session.as_str(), payload.food_item_id, payload.quantity)
        .await?;
    Ok(Json(view))
}

async fn update_item(
    State(state): State<AppState>,
    session: SessionId,
    Path(item_id): Path<i64>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    payload.validate().map_err(ServiceError::from)?;
    let view = state
        .services
        .cart
        .update_item(session.as_str(), item_id, payload.quantity)?;
    Ok(Json(view))
}

async fn remove_item(
    State(state): State<AppState>,
    session: SessionId,
    Path(item_id): Path<i64>,
) -> Json<CartView> {
    Json(state.services.cart.remove_item(session.as_str(), item_id))
}

async fn clear_cart(State(state): State<AppState>, session: SessionId) -> Json<CartView> {
    Json(state.services.cart.clear(session.as_str()).await)
}
