use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;

use crate::{
    error::{api_error, ApiError},
    models::{
        menu::{HallStatusQuery, HallStatusResponse, MenuDayQuery, RestaurantDay},
        restaurant::Restaurant,
    },
    services::menus::MenuService,
    AppState,
};

/// GET /restaurants
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    MenuService::list_restaurants(&state.db)
        .await
        .map(Json)
        .map_err(api_error)
}

/// GET /restaurants/{id}/menus?date=YYYY-MM-DD
pub async fn get_menus(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
    Query(params): Query<MenuDayQuery>,
) -> Result<Json<RestaurantDay>, ApiError> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    MenuService::restaurant_day(&state.db, &restaurant_id, date)
        .await
        .map(Json)
        .map_err(api_error)
}

/// GET /restaurants/{id}/status?date=YYYY-MM-DD&at=YYYY-MM-DDTHH:MM:SS
pub async fn get_status(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
    Query(params): Query<HallStatusQuery>,
) -> Result<Json<HallStatusResponse>, ApiError> {
    MenuService::hall_status(&state.db, &restaurant_id, params.date, params.at)
        .await
        .map(Json)
        .map_err(api_error)
}
