use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::hall_status::{HallStatusReport, PeriodHours};

use super::dish::DishSummary;

/// One meal period of one restaurant on one date.
/// Start and end stay the raw 24-hour strings the menu source delivered.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Period {
    pub id: String,
    pub date: NaiveDate,
    pub restaurant_id: String,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl From<&Period> for PeriodHours {
    fn from(p: &Period) -> Self {
        PeriodHours {
            name: p.name.clone(),
            start: p.start_time.clone(),
            end: p.end_time.clone(),
        }
    }
}

/// At most one row per (restaurant, period, date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Menu {
    pub id: String,
    pub restaurant_id: String,
    pub period_id: String,
    pub date: NaiveDate,
    pub price: Option<String>,
}

/// Flat row of the menu listing query, grouped into [`PeriodMenu`]s afterwards.
#[derive(Debug, Clone, FromRow)]
pub struct MenuDishRow {
    pub period_id: String,
    pub station_id: String,
    pub station_name: String,
    #[sqlx(flatten)]
    pub dish: DishSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationMenu {
    pub station_id: String,
    pub station_name: String,
    pub dishes: Vec<DishSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodMenu {
    #[serde(flatten)]
    pub period: Period,
    pub menu_id: Option<String>,
    pub price: Option<String>,
    pub stations: Vec<StationMenu>,
}

/// GET /restaurants/{id}/menus
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantDay {
    pub restaurant_id: String,
    pub date: NaiveDate,
    pub periods: Vec<PeriodMenu>,
}

/// Query params for GET /restaurants/{id}/menus.
#[derive(Debug, Deserialize)]
pub struct MenuDayQuery {
    /// ISO 8601 date; defaults to today.
    pub date: Option<NaiveDate>,
}

/// Query params for GET /restaurants/{id}/status.
#[derive(Debug, Deserialize)]
pub struct HallStatusQuery {
    pub date: Option<NaiveDate>,
    /// Local wall-clock instant to classify (e.g. "2025-06-02T12:30:00"); defaults to now.
    pub at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HallStatusResponse {
    pub restaurant_id: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub report: HallStatusReport,
}
