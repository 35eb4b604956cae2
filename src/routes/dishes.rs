use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{api_error, ApiError},
    models::dish::DishDetail,
    services::dishes::DishService,
    AppState,
};

/// GET /dishes/{id}
pub async fn get_dish(
    State(state): State<AppState>,
    Path(dish_id): Path<String>,
) -> Result<Json<DishDetail>, ApiError> {
    DishService::get(&state.db, &dish_id)
        .await
        .map(Json)
        .map_err(api_error)
}
