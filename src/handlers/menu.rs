use axum::{extract::State, routing::get, Json, Router};

use crate::{entities::food_item, errors::ServiceError, AppState};

pub fn menu_routes() -> Router<AppState> {
    Router::new().route("/", get(list_menu))
}

/// Available items only, ordered by name.
async fn list_menu(
    State(state): State<AppState>,
) -> Result<Json<Vec<food_item::Model>>, ServiceError> {
    let items = state.services.catalog.list_available().await?;
    Ok(Json(items))
}
