use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{api_error, ApiError},
    middleware::rate_limit::{check_rate_limit, rating_key},
    models::{
        auth::AuthenticatedUser,
        entry::RatedRecord,
        rating::{RateDishRequest, RateDishResponse},
    },
    services::ratings::RatingService,
    AppState,
};

/// GET /me/ratings
pub async fn list_rated(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<RatedRecord>>, ApiError> {
    RatingService::list_rated(&state.db, &user.user_id)
        .await
        .map(Json)
        .map_err(api_error)
}

/// PUT /me/ratings/{dish_id}. `{ "rating": 0 }` clears the rating.
pub async fn rate_dish(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(dish_id): Path<String>,
    Json(body): Json<RateDishRequest>,
) -> Result<Json<RateDishResponse>, ApiError> {
    let mut redis = state.redis.clone();
    check_rate_limit(
        &mut redis,
        &rating_key(&user.user_id),
        state.config.rating_rate_limit,
        60,
    )
    .await?;

    RatingService::rate(&state.db, &user.user_id, &dish_id, body.rating)
        .await
        .map(Json)
        .map_err(api_error)
}
