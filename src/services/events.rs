use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::event::Event;

pub struct EventService;

impl EventService {
    /// Events that have not ended yet, soonest first.
    pub async fn upcoming(
        pool: &PgPool,
        restaurant: Option<&str>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"SELECT title, restaurant_id, description, image_url, start_at, end_at
               FROM events
               WHERE end_at >= $1
                 AND ($2::TEXT IS NULL OR restaurant_id = $2)
               ORDER BY start_at, title"#,
        )
        .bind(now)
        .bind(restaurant)
        .fetch_all(pool)
        .await?;
        Ok(events)
    }
}
