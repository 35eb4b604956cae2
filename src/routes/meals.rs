use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{api_error, ApiError},
    models::{
        auth::AuthenticatedUser,
        meal::{LogMealRequest, LoggedMeal, MealDayQuery, NutritionTotals},
    },
    services::meals::MealService,
    AppState,
};

/// GET /me/meals?date=YYYY-MM-DD
pub async fn list_meals(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<MealDayQuery>,
) -> Result<Json<Vec<LoggedMeal>>, ApiError> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    MealService::list_for_day(&state.db, &user.user_id, date)
        .await
        .map(Json)
        .map_err(api_error)
}

/// POST /me/meals
pub async fn log_meal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<LogMealRequest>,
) -> Result<(StatusCode, Json<LoggedMeal>), ApiError> {
    MealService::log(&state.db, &user.user_id, &body)
        .await
        .map(|meal| (StatusCode::CREATED, Json(meal)))
        .map_err(api_error)
}

/// DELETE /me/meals/{id}
pub async fn delete_meal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match MealService::remove(&state.db, &user.user_id, id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Logged meal not found" })),
        )),
        Err(e) => Err(api_error(e)),
    }
}

/// GET /me/nutrition?date=YYYY-MM-DD
pub async fn daily_nutrition(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<MealDayQuery>,
) -> Result<Json<NutritionTotals>, ApiError> {
    let date = params.date.unwrap_or_else(|| Local::now().date_naive());
    MealService::daily_totals(&state.db, &user.user_id, date)
        .await
        .map(Json)
        .map_err(api_error)
}
