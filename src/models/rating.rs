use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Body for PUT /me/ratings/{dish_id}. A rating of 0 clears the user's rating.
#[derive(Debug, Deserialize)]
pub struct RateDishRequest {
    pub rating: f64,
}

/// Running sum/count kept on the dish row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RatingAggregate {
    pub num_ratings: i32,
    pub total_rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateDishResponse {
    pub dish_id: String,
    /// The user's rating after the write; absent once cleared.
    pub rating: Option<f64>,
    pub num_ratings: i32,
    pub average_rating: Option<f64>,
}
