use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::dish::{DietRestriction, NutritionInfo};
use crate::error::ServiceError;

// ── Payloads served by the menu scraper ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedRestaurant {
    pub id: String,
    pub name: String,
}

/// Everything one restaurant serves on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedDay {
    pub restaurant: ScrapedRestaurant,
    pub date: NaiveDate,
    #[serde(default)]
    pub periods: Vec<ScrapedPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPeriod {
    pub id: String,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub price: Option<String>,
    #[serde(default)]
    pub stations: Vec<ScrapedStation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedStation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dishes: Vec<ScrapedDish>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedDish {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub ingredients: Option<String>,
    pub serving_size: Option<String>,
    pub serving_unit: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub nutrition: NutritionInfo,
    #[serde(default)]
    pub restrictions: DietRestriction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedEvent {
    pub title: String,
    pub restaurant_id: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// ── Rows written by one sync pass ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct StationRow {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DishRow {
    pub station_id: String,
    pub dish: ScrapedDish,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodRow {
    pub id: String,
    pub date: NaiveDate,
    pub restaurant_id: String,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuRow {
    pub id: String,
    pub restaurant_id: String,
    pub period_id: String,
    pub date: NaiveDate,
    pub price: Option<String>,
    pub dish_ids: Vec<String>,
}

/// Deduplicated row sets for one scraped day, in foreign-key order.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlan {
    pub restaurant: ScrapedRestaurant,
    pub stations: Vec<StationRow>,
    pub dishes: Vec<DishRow>,
    pub periods: Vec<PeriodRow>,
    pub menus: Vec<MenuRow>,
}

// ── Run control ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncKind {
    /// Menus of the start date only.
    Daily,
    /// Menus of `days` consecutive dates plus the event list.
    Weekly { days: u32 },
}

/// Longest span a single weekly pass may cover.
pub const MAX_SYNC_DAYS: u32 = 31;

impl SyncKind {
    /// Weekly pass over `days` consecutive dates, `1..=MAX_SYNC_DAYS`.
    pub fn weekly(days: u32) -> Result<SyncKind, ServiceError> {
        if !(1..=MAX_SYNC_DAYS).contains(&days) {
            return Err(ServiceError::Validation(format!(
                "days must be between 1 and {MAX_SYNC_DAYS}, got {days}"
            )));
        }
        Ok(SyncKind::Weekly { days })
    }

    pub fn label(&self) -> &'static str {
        match self {
            SyncKind::Daily => "daily",
            SyncKind::Weekly { .. } => "weekly",
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            SyncKind::Daily => 1,
            SyncKind::Weekly { days } => *days,
        }
    }
}

/// Body for POST /admin/sync.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub kind: String,
    pub date: Option<NaiveDate>,
    pub days: Option<u32>,
    pub restaurants: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub days_synced: usize,
    pub days_failed: usize,
    pub dishes_written: usize,
    pub menus_written: usize,
    pub events_written: usize,
    pub failures: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_span_is_bounded() {
        assert_eq!(SyncKind::weekly(1).unwrap(), SyncKind::Weekly { days: 1 });
        assert_eq!(SyncKind::weekly(MAX_SYNC_DAYS).unwrap().days(), MAX_SYNC_DAYS);
        assert!(SyncKind::weekly(0).is_err());
        assert!(SyncKind::weekly(MAX_SYNC_DAYS + 1).is_err());
        assert!(SyncKind::weekly(u32::MAX).is_err());
    }
}
