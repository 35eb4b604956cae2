use std::collections::HashMap;

use chrono::{Local, NaiveDate, NaiveDateTime};
use sqlx::PgPool;

use crate::{
    error::ServiceError,
    models::{
        menu::{
            HallStatusResponse, Menu, MenuDishRow, Period, PeriodMenu, RestaurantDay, StationMenu,
        },
        restaurant::Restaurant,
    },
    services::hall_status::{self, PeriodHours},
};

pub struct MenuService;

impl MenuService {
    pub async fn list_restaurants(pool: &PgPool) -> anyhow::Result<Vec<Restaurant>> {
        let restaurants =
            sqlx::query_as::<_, Restaurant>("SELECT id, name FROM restaurants ORDER BY name")
                .fetch_all(pool)
                .await?;
        Ok(restaurants)
    }

    async fn ensure_restaurant(pool: &PgPool, restaurant_id: &str) -> anyhow::Result<()> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM restaurants WHERE id = $1)")
                .bind(restaurant_id)
                .fetch_one(pool)
                .await?;
        if !found {
            return Err(ServiceError::NotFound(format!("Restaurant '{restaurant_id}'")).into());
        }
        Ok(())
    }

    pub async fn periods(
        pool: &PgPool,
        restaurant_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Period>> {
        let periods = sqlx::query_as::<_, Period>(
            r#"SELECT id, date, restaurant_id, name, start_time, end_time
               FROM periods
               WHERE restaurant_id = $1 AND date = $2
               ORDER BY start_time NULLS LAST, name"#,
        )
        .bind(restaurant_id)
        .bind(date)
        .fetch_all(pool)
        .await?;
        Ok(periods)
    }

    /// Every period of one restaurant on one date with its dishes grouped by station.
    pub async fn restaurant_day(
        pool: &PgPool,
        restaurant_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<RestaurantDay> {
        Self::ensure_restaurant(pool, restaurant_id).await?;

        let periods = Self::periods(pool, restaurant_id, date).await?;

        let menus = sqlx::query_as::<_, Menu>(
            r#"SELECT id, restaurant_id, period_id, date, price
               FROM menus
               WHERE restaurant_id = $1 AND date = $2"#,
        )
        .bind(restaurant_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        let rows = sqlx::query_as::<_, MenuDishRow>(
            r#"SELECT m.period_id, s.id AS station_id, s.name AS station_name,
                      d.id, d.name, s.restaurant_id, d.image_url, d.num_ratings, d.total_rating
               FROM menus m
               JOIN dishes_to_menus dm ON dm.menu_id = m.id
               JOIN dishes d           ON d.id = dm.dish_id
               JOIN stations s         ON s.id = d.station_id
               WHERE m.restaurant_id = $1 AND m.date = $2
               ORDER BY s.name, d.name"#,
        )
        .bind(restaurant_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(RestaurantDay {
            restaurant_id: restaurant_id.to_string(),
            date,
            periods: group_menus(periods, menus, rows),
        })
    }

    /// Hall status of a restaurant for `date`, classified at `at` (local time).
    pub async fn hall_status(
        pool: &PgPool,
        restaurant_id: &str,
        date: Option<NaiveDate>,
        at: Option<NaiveDateTime>,
    ) -> anyhow::Result<HallStatusResponse> {
        Self::ensure_restaurant(pool, restaurant_id).await?;

        let now = Local::now().naive_local();
        let selected = selected_instant(now, date, at);
        let date = selected.date();

        let periods = Self::periods(pool, restaurant_id, date).await?;
        let hours: Vec<PeriodHours> = periods.iter().map(PeriodHours::from).collect();
        let report = hall_status::derive(&hours, Some(selected), now.date());

        Ok(HallStatusResponse {
            restaurant_id: restaurant_id.to_string(),
            date,
            report,
        })
    }
}

/// The instant being looked at: an explicit `at`, else `date` at the current
/// time of day, else now.
pub fn selected_instant(
    now: NaiveDateTime,
    date: Option<NaiveDate>,
    at: Option<NaiveDateTime>,
) -> NaiveDateTime {
    match (at, date) {
        (Some(at), _) => at,
        (None, Some(date)) => date.and_time(now.time()),
        (None, None) => now,
    }
}

/// Attach each period's menu and dishes, stations in first-seen order.
pub fn group_menus(
    periods: Vec<Period>,
    menus: Vec<Menu>,
    rows: Vec<MenuDishRow>,
) -> Vec<PeriodMenu> {
    let menus_by_period: HashMap<String, Menu> =
        menus.into_iter().map(|m| (m.period_id.clone(), m)).collect();

    let mut stations_by_period: HashMap<String, Vec<StationMenu>> = HashMap::new();
    for row in rows {
        let stations = stations_by_period.entry(row.period_id).or_default();
        match stations.iter_mut().find(|s| s.station_id == row.station_id) {
            Some(station) => station.dishes.push(row.dish),
            None => stations.push(StationMenu {
                station_id: row.station_id,
                station_name: row.station_name,
                dishes: vec![row.dish],
            }),
        }
    }

    periods
        .into_iter()
        .map(|period| {
            let menu = menus_by_period.get(&period.id);
            PeriodMenu {
                menu_id: menu.map(|m| m.id.clone()),
                price: menu.and_then(|m| m.price.clone()),
                stations: stations_by_period.remove(&period.id).unwrap_or_default(),
                period,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dish::DishSummary;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn period(id: &str, name: &str) -> Period {
        Period {
            id: id.into(),
            date: date(),
            restaurant_id: "brandywine".into(),
            name: name.into(),
            start_time: Some("0700".into()),
            end_time: Some("1100".into()),
        }
    }

    fn row(period_id: &str, station: &str, dish_id: &str) -> MenuDishRow {
        MenuDishRow {
            period_id: period_id.into(),
            station_id: station.into(),
            station_name: station.to_uppercase(),
            dish: DishSummary {
                id: dish_id.into(),
                name: dish_id.into(),
                restaurant_id: "brandywine".into(),
                image_url: None,
                num_ratings: 0,
                total_rating: 0.0,
            },
        }
    }

    #[test]
    fn test_group_menus() {
        let periods = vec![period("49", "breakfast"), period("106", "lunch")];
        let menus = vec![Menu {
            id: "brandywine-49-2025-03-04".into(),
            restaurant_id: "brandywine".into(),
            period_id: "49".into(),
            date: date(),
            price: Some("$11.00".into()),
        }];
        let rows = vec![
            row("49", "grill", "eggs"),
            row("49", "deli", "bagel"),
            row("49", "grill", "bacon"),
        ];

        let grouped = group_menus(periods, menus, rows);
        assert_eq!(grouped.len(), 2);

        let breakfast = &grouped[0];
        assert_eq!(breakfast.menu_id.as_deref(), Some("brandywine-49-2025-03-04"));
        assert_eq!(breakfast.price.as_deref(), Some("$11.00"));
        let stations: Vec<(&str, usize)> = breakfast
            .stations
            .iter()
            .map(|s| (s.station_id.as_str(), s.dishes.len()))
            .collect();
        assert_eq!(stations, vec![("grill", 2), ("deli", 1)]);

        let lunch = &grouped[1];
        assert_eq!(lunch.menu_id, None);
        assert!(lunch.stations.is_empty());
    }

    #[test]
    fn test_selected_instant() {
        let now = date().and_hms_opt(9, 30, 0).unwrap();
        let other = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap();
        let explicit = other.and_hms_opt(18, 0, 0).unwrap();

        assert_eq!(selected_instant(now, None, None), now);
        assert_eq!(
            selected_instant(now, Some(other), None),
            other.and_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(selected_instant(now, Some(other), Some(explicit)), explicit);
    }
}
