use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A dining-hall special occasion. Written only by the menu sync.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub title: String,
    pub restaurant_id: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Query params for GET /events.
#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub restaurant: Option<String>,
}
