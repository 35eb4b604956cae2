use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    models::meal::{LogMealRequest, LoggedMeal, NutritionTotals},
    services::{dishes::DishService, metrics::MEALS_LOGGED_COUNTER, users::UserService},
};

/// Servings are logged in half-serving steps.
pub fn validate_servings(servings: f64) -> Result<(), ServiceError> {
    if !servings.is_finite() || servings <= 0.0 || (servings * 2.0).fract() != 0.0 {
        return Err(ServiceError::Validation(format!(
            "Servings must be a positive multiple of 0.5, got {servings}"
        )));
    }
    Ok(())
}

/// UTC bounds of one local calendar day, `[start, end)`.
pub fn local_day_bounds<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
) -> anyhow::Result<(DateTime<Utc>, DateTime<Utc>)> {
    let bound = |day: NaiveDate| -> anyhow::Result<DateTime<Utc>> {
        let midnight = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date {day}"))?;
        tz.from_local_datetime(&midnight)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| anyhow::anyhow!("No local midnight on {day}"))
    };
    let next = date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| ServiceError::Validation(format!("Date {date} is out of range")))?;
    Ok((bound(date)?, bound(next)?))
}

pub struct MealService;

impl MealService {
    pub async fn log(
        pool: &PgPool,
        user_id: &str,
        req: &LogMealRequest,
    ) -> anyhow::Result<LoggedMeal> {
        validate_servings(req.servings)?;
        if !DishService::exists(pool, &req.dish_id).await? {
            return Err(ServiceError::NotFound(format!("Dish '{}'", req.dish_id)).into());
        }

        let mut tx = pool.begin().await?;
        UserService::ensure(&mut *tx, user_id).await?;
        let meal = sqlx::query_as::<_, LoggedMeal>(
            r#"WITH inserted AS (
                   INSERT INTO logged_meals (id, user_id, dish_id, servings, eaten_at)
                   VALUES ($1, $2, $3, $4, $5)
                   RETURNING id, user_id, dish_id, servings, eaten_at, created_at
               )
               SELECT i.id, i.user_id, i.dish_id, d.name AS dish_name,
                      i.servings, i.eaten_at, i.created_at
               FROM inserted i
               JOIN dishes d ON d.id = i.dish_id"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&req.dish_id)
        .bind(req.servings)
        .bind(req.eaten_at.unwrap_or_else(Utc::now))
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        MEALS_LOGGED_COUNTER.inc();
        Ok(meal)
    }

    pub async fn list_for_day(
        pool: &PgPool,
        user_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<LoggedMeal>> {
        let (start, end) = local_day_bounds(&Local, date)?;
        let meals = sqlx::query_as::<_, LoggedMeal>(
            r#"SELECT lm.id, lm.user_id, lm.dish_id, d.name AS dish_name,
                      lm.servings, lm.eaten_at, lm.created_at
               FROM logged_meals lm
               JOIN dishes d ON d.id = lm.dish_id
               WHERE lm.user_id = $1 AND lm.eaten_at >= $2 AND lm.eaten_at < $3
               ORDER BY lm.eaten_at"#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
        Ok(meals)
    }

    /// Only the owner can delete a log entry; returns whether one was removed.
    pub async fn remove(pool: &PgPool, user_id: &str, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM logged_meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Nutrition facts times servings, summed over the user's meals of one local day.
    pub async fn daily_totals(
        pool: &PgPool,
        user_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<NutritionTotals> {
        let (start, end) = local_day_bounds(&Local, date)?;
        let totals = sqlx::query_as::<_, NutritionTotals>(
            r#"SELECT COUNT(lm.id)::BIGINT                                         AS meals,
                      COALESCE(SUM(n.calories      * lm.servings), 0)::FLOAT8     AS calories,
                      COALESCE(SUM(n.protein_g     * lm.servings), 0)::FLOAT8     AS protein_g,
                      COALESCE(SUM(n.total_carbs_g * lm.servings), 0)::FLOAT8     AS total_carbs_g,
                      COALESCE(SUM(n.total_fat_g   * lm.servings), 0)::FLOAT8     AS total_fat_g
               FROM logged_meals lm
               LEFT JOIN nutrition_infos n ON n.dish_id = lm.dish_id
               WHERE lm.user_id = $1 AND lm.eaten_at >= $2 AND lm.eaten_at < $3"#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::models::meal::MealDayQuery;

    #[test]
    fn test_validate_servings() {
        assert!(validate_servings(0.5).is_ok());
        assert!(validate_servings(1.0).is_ok());
        assert!(validate_servings(2.5).is_ok());
        assert!(validate_servings(0.0).is_err());
        assert!(validate_servings(-1.0).is_err());
        assert!(validate_servings(0.75).is_err());
        assert!(validate_servings(f64::INFINITY).is_err());
    }

    #[test]
    fn test_local_day_bounds() {
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let (start, end) = local_day_bounds(&pacific, date).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 16, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_last_representable_day_is_rejected() {
        let err = local_day_bounds(&Utc, NaiveDate::MAX).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_extreme_query_date_is_rejected() {
        let raw = format!(r#"{{"date":"{}"}}"#, NaiveDate::MAX);
        let query: MealDayQuery = serde_json::from_str(&raw).unwrap();
        assert_eq!(query.date, Some(NaiveDate::MAX));
        assert!(local_day_bounds(&Utc, NaiveDate::MAX).is_err());
    }
}
