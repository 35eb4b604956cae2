use sqlx::PgPool;

use crate::{
    error::ServiceError,
    models::{entry::FavoriteRecord, favorite::Favorite},
    services::{dishes::DishService, metrics::FAVORITES_COUNTER, users::UserService},
};

pub struct FavoriteService;

impl FavoriteService {
    pub async fn list(pool: &PgPool, user_id: &str) -> anyhow::Result<Vec<FavoriteRecord>> {
        let rows = sqlx::query_as::<_, FavoriteRecord>(
            r#"SELECT f.dish_id, f.created_at, f.updated_at,
                      d.id, d.name, s.restaurant_id, d.image_url, d.num_ratings, d.total_rating
               FROM favorites f
               JOIN dishes d   ON d.id = f.dish_id
               JOIN stations s ON s.id = d.station_id
               WHERE f.user_id = $1
               ORDER BY f.updated_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Bookmark a dish. Re-adding an existing favorite only refreshes `updated_at`.
    pub async fn add(pool: &PgPool, user_id: &str, dish_id: &str) -> anyhow::Result<Favorite> {
        if !DishService::exists(pool, dish_id).await? {
            return Err(ServiceError::NotFound(format!("Dish '{dish_id}'")).into());
        }

        let mut tx = pool.begin().await?;
        UserService::ensure(&mut *tx, user_id).await?;
        let favorite = sqlx::query_as::<_, Favorite>(
            r#"INSERT INTO favorites (user_id, dish_id)
               VALUES ($1, $2)
               ON CONFLICT (user_id, dish_id) DO UPDATE SET updated_at = NOW()
               RETURNING user_id, dish_id, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(dish_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        FAVORITES_COUNTER.with_label_values(&["add"]).inc();
        Ok(favorite)
    }

    /// Returns whether a favorite was removed.
    pub async fn remove(pool: &PgPool, user_id: &str, dish_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND dish_id = $2")
            .bind(user_id)
            .bind(dish_id)
            .execute(pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            FAVORITES_COUNTER.with_label_values(&["remove"]).inc();
        }
        Ok(removed)
    }
}
