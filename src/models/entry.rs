use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::dish::DishSummary;

/// A dish the user bookmarked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FavoriteRecord {
    pub dish_id: String,
    #[sqlx(flatten)]
    pub dish: DishSummary,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A dish the user rated, with their own rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RatedRecord {
    pub dish_id: String,
    #[sqlx(flatten)]
    pub dish: DishSummary,
    pub rating: f64,
    pub rated_at: Option<DateTime<Utc>>,
}

/// A dish annotated with the user's favorite/rating relationship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedEntry {
    pub dish_id: String,
    pub dish: DishSummary,
    pub is_favorited: bool,
    pub rating: Option<f64>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySort {
    /// Most recently touched first.
    #[default]
    Recent,
    Oldest,
    Alphabetical,
    /// Most ratings first.
    MostRated,
}

/// Query params for GET /me/entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryQuery {
    /// Restaurant id to keep; all restaurants when absent.
    pub location: Option<String>,
    /// Case-insensitive substring of the dish name.
    pub search: Option<String>,
    #[serde(default)]
    pub sort: EntrySort,
}
