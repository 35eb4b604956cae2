use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One instance of a user eating some servings of a dish.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoggedMeal {
    pub id: Uuid,
    pub user_id: String,
    pub dish_id: String,
    pub dish_name: String,
    pub servings: f64,
    pub eaten_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Body for POST /me/meals.
#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    pub dish_id: String,
    pub servings: f64,
    /// Defaults to now.
    pub eaten_at: Option<DateTime<Utc>>,
}

/// Query params for GET /me/meals and GET /me/nutrition.
#[derive(Debug, Deserialize)]
pub struct MealDayQuery {
    /// Local calendar day; defaults to today.
    pub date: Option<NaiveDate>,
}

/// Sum of nutrition facts times servings over one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NutritionTotals {
    pub meals: i64,
    pub calories: f64,
    pub protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
}
