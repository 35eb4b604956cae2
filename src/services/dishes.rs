use sqlx::PgPool;

use crate::{
    error::ServiceError,
    models::dish::{DietRestriction, Dish, DishDetail, NutritionInfo},
};

pub struct DishService;

impl DishService {
    pub async fn exists(pool: &PgPool, id: &str) -> anyhow::Result<bool> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM dishes WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(found)
    }

    /// One dish with its nutrition facts, dietary flags and average rating.
    pub async fn get(pool: &PgPool, id: &str) -> anyhow::Result<DishDetail> {
        let dish = sqlx::query_as::<_, Dish>(
            r#"SELECT id, station_id, name, description, category, ingredients,
                      serving_size, serving_unit, image_url, num_ratings, total_rating,
                      created_at, updated_at
               FROM dishes WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Dish '{id}'")))?;

        let (restaurant_id, station_name): (String, String) =
            sqlx::query_as("SELECT restaurant_id, name FROM stations WHERE id = $1")
                .bind(&dish.station_id)
                .fetch_one(pool)
                .await?;

        let nutrition = sqlx::query_as::<_, NutritionInfo>(
            r#"SELECT calories, total_fat_g, trans_fat_g, saturated_fat_g, cholesterol_mg,
                      sodium_mg, total_carbs_g, dietary_fiber_g, sugars_g, protein_g,
                      vitamin_a_iu, vitamin_c_iu, calcium_mg, iron_mg
               FROM nutrition_infos WHERE dish_id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        let restrictions = sqlx::query_as::<_, DietRestriction>(
            r#"SELECT contains_eggs, contains_fish, contains_milk, contains_peanuts,
                      contains_sesame, contains_shellfish, contains_soy, contains_tree_nuts,
                      contains_wheat, is_gluten_free, is_halal, is_kosher, is_locally_grown,
                      is_organic, is_vegan, is_vegetarian
               FROM diet_restrictions WHERE dish_id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(DishDetail {
            average_rating: dish.average_rating(),
            dish,
            restaurant_id,
            station_name,
            nutrition,
            restrictions,
        })
    }
}
