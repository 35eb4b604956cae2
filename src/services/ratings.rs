use sqlx::PgPool;

use crate::{
    error::ServiceError,
    models::{
        dish::average_rating,
        entry::RatedRecord,
        rating::{RateDishResponse, RatingAggregate},
    },
    services::{metrics::RATINGS_COUNTER, users::UserService},
};

pub const MAX_RATING: f64 = 5.0;

/// Ratings are half stars between 0 and 5; 0 means "clear my rating".
pub fn validate_rating(rating: f64) -> Result<(), ServiceError> {
    let half_steps = (rating * 2.0).fract() == 0.0;
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) || !half_steps {
        return Err(ServiceError::Validation(format!(
            "Rating must be a multiple of 0.5 between 0 and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

impl RatingAggregate {
    /// Aggregate after a user moves from `previous` to `next` (0 clears).
    pub fn apply(self, previous: Option<f64>, next: f64) -> RatingAggregate {
        let (num_ratings, total_rating) = match (previous, next == 0.0) {
            (Some(prev), true) => (self.num_ratings - 1, self.total_rating - prev),
            (None, true) => (self.num_ratings, self.total_rating),
            (Some(prev), false) => (self.num_ratings, self.total_rating - prev + next),
            (None, false) => (self.num_ratings + 1, self.total_rating + next),
        };

        if num_ratings <= 0 {
            RatingAggregate {
                num_ratings: 0,
                total_rating: 0.0,
            }
        } else {
            RatingAggregate {
                num_ratings,
                total_rating: total_rating.max(0.0),
            }
        }
    }
}

pub struct RatingService;

impl RatingService {
    /// Set, replace or clear (`rating == 0`) the user's rating of a dish and
    /// keep the dish's sum/count aggregate in step, in one transaction.
    pub async fn rate(
        pool: &PgPool,
        user_id: &str,
        dish_id: &str,
        rating: f64,
    ) -> anyhow::Result<RateDishResponse> {
        validate_rating(rating)?;

        let mut tx = pool.begin().await?;

        let current = sqlx::query_as::<_, RatingAggregate>(
            "SELECT num_ratings, total_rating FROM dishes WHERE id = $1 FOR UPDATE",
        )
        .bind(dish_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Dish '{dish_id}'")))?;

        UserService::ensure(&mut *tx, user_id).await?;

        let previous: Option<f64> = sqlx::query_scalar(
            "SELECT rating FROM ratings WHERE user_id = $1 AND dish_id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(dish_id)
        .fetch_optional(&mut *tx)
        .await?;

        let next = current.apply(previous, rating);

        if rating == 0.0 {
            sqlx::query("DELETE FROM ratings WHERE user_id = $1 AND dish_id = $2")
                .bind(user_id)
                .bind(dish_id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query(
                r#"INSERT INTO ratings (user_id, dish_id, rating)
                   VALUES ($1, $2, $3)
                   ON CONFLICT (user_id, dish_id) DO UPDATE SET
                       rating = EXCLUDED.rating,
                       updated_at = NOW()"#,
            )
            .bind(user_id)
            .bind(dish_id)
            .bind(rating)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE dishes SET num_ratings = $2, total_rating = $3 WHERE id = $1")
            .bind(dish_id)
            .bind(next.num_ratings)
            .bind(next.total_rating)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let action = match (previous, rating == 0.0) {
            (_, true) => "clear",
            (Some(_), false) => "update",
            (None, false) => "create",
        };
        RATINGS_COUNTER.with_label_values(&[action]).inc();

        Ok(RateDishResponse {
            dish_id: dish_id.to_string(),
            rating: (rating != 0.0).then_some(rating),
            num_ratings: next.num_ratings,
            average_rating: average_rating(next.total_rating, next.num_ratings),
        })
    }

    pub async fn list_rated(pool: &PgPool, user_id: &str) -> anyhow::Result<Vec<RatedRecord>> {
        let rows = sqlx::query_as::<_, RatedRecord>(
            r#"SELECT r.dish_id, r.rating, r.updated_at AS rated_at,
                      d.id, d.name, s.restaurant_id, d.image_url, d.num_ratings, d.total_rating
               FROM ratings r
               JOIN dishes d   ON d.id = r.dish_id
               JOIN stations s ON s.id = d.station_id
               WHERE r.user_id = $1
               ORDER BY r.updated_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(num_ratings: i32, total_rating: f64) -> RatingAggregate {
        RatingAggregate {
            num_ratings,
            total_rating,
        }
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(0.5).is_ok());
        assert!(validate_rating(3.5).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(4.25).is_err());
        assert!(validate_rating(5.5).is_err());
        assert!(validate_rating(-0.5).is_err());
        assert!(validate_rating(f64::NAN).is_err());
    }

    #[test]
    fn test_first_rating_adds_to_aggregate() {
        assert_eq!(agg(2, 7.0).apply(None, 4.0), agg(3, 11.0));
    }

    #[test]
    fn test_rerating_replaces_previous_value() {
        assert_eq!(agg(3, 11.0).apply(Some(4.0), 2.5), agg(3, 9.5));
    }

    #[test]
    fn test_zero_clears_existing_rating() {
        assert_eq!(agg(3, 11.0).apply(Some(4.0), 0.0), agg(2, 7.0));
        assert_eq!(agg(1, 4.0).apply(Some(4.0), 0.0), agg(0, 0.0));
    }

    #[test]
    fn test_zero_without_rating_is_noop() {
        assert_eq!(agg(2, 7.0).apply(None, 0.0), agg(2, 7.0));
    }
}
