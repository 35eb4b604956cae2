use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::{
    error::{api_error, ApiError},
    models::{auth::AuthenticatedUser, entry::FavoriteRecord, favorite::Favorite},
    services::favorites::FavoriteService,
    AppState,
};

/// GET /me/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<FavoriteRecord>>, ApiError> {
    FavoriteService::list(&state.db, &user.user_id)
        .await
        .map(Json)
        .map_err(api_error)
}

/// PUT /me/favorites/{dish_id}
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(dish_id): Path<String>,
) -> Result<Json<Favorite>, ApiError> {
    FavoriteService::add(&state.db, &user.user_id, &dish_id)
        .await
        .map(Json)
        .map_err(api_error)
}

/// DELETE /me/favorites/{dish_id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(dish_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match FavoriteService::remove(&state.db, &user.user_id, &dish_id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Favorite not found" })),
        )),
        Err(e) => Err(api_error(e)),
    }
}
