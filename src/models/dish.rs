use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A dish as stored; the same id is reused whenever the recipe comes back on a menu.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dish {
    pub id: String,
    pub station_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub ingredients: Option<String>,
    pub serving_size: Option<String>,
    pub serving_unit: Option<String>,
    pub image_url: Option<String>,
    pub num_ratings: i32,
    pub total_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dish {
    pub fn average_rating(&self) -> Option<f64> {
        average_rating(self.total_rating, self.num_ratings)
    }
}

/// Average of the half-star ratings, absent while nobody has rated the dish.
pub fn average_rating(total_rating: f64, num_ratings: i32) -> Option<f64> {
    if num_ratings <= 0 {
        None
    } else {
        Some(total_rating / num_ratings as f64)
    }
}

/// Nutrition facts per serving. Every value is optional: the menu source
/// frequently omits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct NutritionInfo {
    pub calories: Option<f64>,
    pub total_fat_g: Option<f64>,
    pub trans_fat_g: Option<f64>,
    pub saturated_fat_g: Option<f64>,
    pub cholesterol_mg: Option<f64>,
    pub sodium_mg: Option<f64>,
    pub total_carbs_g: Option<f64>,
    pub dietary_fiber_g: Option<f64>,
    pub sugars_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub vitamin_a_iu: Option<f64>,
    pub vitamin_c_iu: Option<f64>,
    pub calcium_mg: Option<f64>,
    pub iron_mg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct DietRestriction {
    pub contains_eggs: bool,
    pub contains_fish: bool,
    pub contains_milk: bool,
    pub contains_peanuts: bool,
    pub contains_sesame: bool,
    pub contains_shellfish: bool,
    pub contains_soy: bool,
    pub contains_tree_nuts: bool,
    pub contains_wheat: bool,
    pub is_gluten_free: bool,
    pub is_halal: bool,
    pub is_kosher: bool,
    pub is_locally_grown: bool,
    pub is_organic: bool,
    pub is_vegan: bool,
    pub is_vegetarian: bool,
}

/// GET /dishes/{id}
#[derive(Debug, Clone, Serialize)]
pub struct DishDetail {
    #[serde(flatten)]
    pub dish: Dish,
    pub restaurant_id: String,
    pub station_name: String,
    pub average_rating: Option<f64>,
    pub nutrition: Option<NutritionInfo>,
    pub restrictions: Option<DietRestriction>,
}

/// Compact dish payload carried by favorites, ratings and menu listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DishSummary {
    pub id: String,
    pub name: String,
    pub restaurant_id: String,
    pub image_url: Option<String>,
    pub num_ratings: i32,
    pub total_rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(0.0, 0), None);
        assert_eq!(average_rating(9.0, 2), Some(4.5));
        assert_eq!(average_rating(3.0, -1), None);
    }
}
