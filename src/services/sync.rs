//! Menu and event synchronisation from the scraper service.
//!
//! Every write is a keyed insert-or-update, so re-running a pass (or two
//! passes racing each other) converges on the same rows.

use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate};
use futures_util::{stream, StreamExt};
use reqwest::Client;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info, warn};

use crate::{
    error::ServiceError,
    models::sync::{
        DishRow, MenuRow, PeriodRow, ScrapedDay, ScrapedEvent, StationRow, SyncKind, SyncPlan,
        SyncReport,
    },
    services::metrics::{SYNC_ROWS_COUNTER, SYNC_RUNS_COUNTER},
};

/// Concurrent requests against the scraper during one pass.
const FETCH_CONCURRENCY: usize = 4;

/// HTTP client for the menu scraper.
#[derive(Clone)]
pub struct MenuSource {
    client: Client,
    base_url: String,
}

impl MenuSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET {base}/menus/{restaurant}?date=YYYY-MM-DD
    pub async fn fetch_day(&self, restaurant: &str, date: NaiveDate) -> anyhow::Result<ScrapedDay> {
        let day = self
            .client
            .get(format!("{}/menus/{}", self.base_url, restaurant))
            .query(&[("date", date.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json::<ScrapedDay>()
            .await?;
        Ok(day)
    }

    /// GET {base}/events
    pub async fn fetch_events(&self) -> anyhow::Result<Vec<ScrapedEvent>> {
        let events = self
            .client
            .get(format!("{}/events", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<ScrapedEvent>>()
            .await?;
        Ok(events)
    }
}

/// Natural key of a menu: one per restaurant, period and date.
pub fn menu_id(restaurant_id: &str, period_id: &str, date: NaiveDate) -> String {
    format!("{restaurant_id}-{period_id}-{date}")
}

/// Keeps rows in first-seen order while letting later duplicates replace them.
struct Keyed<T> {
    rows: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Keyed<T> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn put(&mut self, key: String, row: T) {
        match self.index.get(&key) {
            Some(&i) => self.rows[i] = row,
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(row);
            }
        }
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.index.get(key).map(|&i| &mut self.rows[i])
    }
}

/// Flatten one scraped day into deduplicated row sets, each sorted by key.
pub fn plan_day(day: &ScrapedDay) -> SyncPlan {
    let restaurant_id = day.restaurant.id.as_str();
    let mut stations = Keyed::new();
    let mut dishes = Keyed::new();
    let mut periods = Keyed::new();
    let mut menus: Keyed<MenuRow> = Keyed::new();

    for period in &day.periods {
        periods.put(
            period.id.clone(),
            PeriodRow {
                id: period.id.clone(),
                date: day.date,
                restaurant_id: restaurant_id.to_string(),
                name: period.name.clone(),
                start_time: period.start_time.clone(),
                end_time: period.end_time.clone(),
            },
        );

        let id = menu_id(restaurant_id, &period.id, day.date);
        if menus.get_mut(&id).is_none() {
            menus.put(
                id.clone(),
                MenuRow {
                    id: id.clone(),
                    restaurant_id: restaurant_id.to_string(),
                    period_id: period.id.clone(),
                    date: day.date,
                    price: None,
                    dish_ids: Vec::new(),
                },
            );
        }

        for station in &period.stations {
            stations.put(
                station.id.clone(),
                StationRow {
                    id: station.id.clone(),
                    restaurant_id: restaurant_id.to_string(),
                    name: station.name.clone(),
                },
            );

            for dish in &station.dishes {
                dishes.put(
                    dish.id.clone(),
                    DishRow {
                        station_id: station.id.clone(),
                        dish: dish.clone(),
                    },
                );
            }
        }

        if let Some(menu) = menus.get_mut(&id) {
            if period.price.is_some() {
                menu.price = period.price.clone();
            }
            for dish in period.stations.iter().flat_map(|s| &s.dishes) {
                if !menu.dish_ids.contains(&dish.id) {
                    menu.dish_ids.push(dish.id.clone());
                }
            }
        }
    }

    // Rows are written, and locked, in key order so that overlapping passes
    // over shared dishes and stations cannot deadlock each other.
    let mut plan = SyncPlan {
        restaurant: day.restaurant.clone(),
        stations: stations.rows,
        dishes: dishes.rows,
        periods: periods.rows,
        menus: menus.rows,
    };
    plan.stations.sort_by(|a, b| a.id.cmp(&b.id));
    plan.dishes.sort_by(|a, b| a.dish.id.cmp(&b.dish.id));
    plan.periods.sort_by(|a, b| a.id.cmp(&b.id));
    plan.menus.sort_by(|a, b| a.id.cmp(&b.id));
    for menu in &mut plan.menus {
        menu.dish_ids.sort();
    }
    plan
}

/// Row counts written by [`SyncService::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedCounts {
    pub dishes: usize,
    pub menus: usize,
}

pub struct SyncService;

impl SyncService {
    /// Write one plan in a single transaction.
    pub async fn apply(pool: &PgPool, plan: &SyncPlan) -> anyhow::Result<AppliedCounts> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO restaurants (id, name) VALUES ($1, $2)
               ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, updated_at = NOW()"#,
        )
        .bind(&plan.restaurant.id)
        .bind(&plan.restaurant.name)
        .execute(&mut *tx)
        .await?;

        for station in &plan.stations {
            sqlx::query(
                r#"INSERT INTO stations (id, restaurant_id, name) VALUES ($1, $2, $3)
                   ON CONFLICT (id) DO UPDATE SET
                       restaurant_id = EXCLUDED.restaurant_id,
                       name          = EXCLUDED.name,
                       updated_at    = NOW()"#,
            )
            .bind(&station.id)
            .bind(&station.restaurant_id)
            .bind(&station.name)
            .execute(&mut *tx)
            .await?;
        }

        for row in &plan.dishes {
            upsert_dish(&mut tx, row).await?;
        }

        for period in &plan.periods {
            sqlx::query(
                r#"INSERT INTO periods (id, date, restaurant_id, name, start_time, end_time)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   ON CONFLICT (id, date, restaurant_id) DO UPDATE SET
                       name       = EXCLUDED.name,
                       start_time = EXCLUDED.start_time,
                       end_time   = EXCLUDED.end_time,
                       updated_at = NOW()"#,
            )
            .bind(&period.id)
            .bind(period.date)
            .bind(&period.restaurant_id)
            .bind(&period.name)
            .bind(&period.start_time)
            .bind(&period.end_time)
            .execute(&mut *tx)
            .await?;
        }

        for menu in &plan.menus {
            let stored_id: String = sqlx::query_scalar(
                r#"INSERT INTO menus (id, restaurant_id, period_id, date, price)
                   VALUES ($1, $2, $3, $4, $5)
                   ON CONFLICT (restaurant_id, period_id, date) DO UPDATE SET
                       price      = EXCLUDED.price,
                       updated_at = NOW()
                   RETURNING id"#,
            )
            .bind(&menu.id)
            .bind(&menu.restaurant_id)
            .bind(&menu.period_id)
            .bind(menu.date)
            .bind(&menu.price)
            .fetch_one(&mut *tx)
            .await?;

            for dish_id in &menu.dish_ids {
                sqlx::query(
                    r#"INSERT INTO dishes_to_menus (dish_id, menu_id) VALUES ($1, $2)
                       ON CONFLICT (dish_id, menu_id) DO NOTHING"#,
                )
                .bind(dish_id)
                .bind(&stored_id)
                .execute(&mut *tx)
                .await?;
            }

            // Dishes dropped from the menu since the last pass.
            sqlx::query(
                "DELETE FROM dishes_to_menus WHERE menu_id = $1 AND NOT (dish_id = ANY($2))",
            )
            .bind(&stored_id)
            .bind(&menu.dish_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        SYNC_ROWS_COUNTER
            .with_label_values(&["dishes"])
            .inc_by(plan.dishes.len() as f64);
        SYNC_ROWS_COUNTER
            .with_label_values(&["menus"])
            .inc_by(plan.menus.len() as f64);

        Ok(AppliedCounts {
            dishes: plan.dishes.len(),
            menus: plan.menus.len(),
        })
    }

    /// Upsert events keyed on (title, restaurant, start). Events of unknown
    /// restaurants are skipped.
    pub async fn upsert_events(pool: &PgPool, events: &[ScrapedEvent]) -> anyhow::Result<usize> {
        let known: HashSet<String> = sqlx::query_scalar::<_, String>("SELECT id FROM restaurants")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

        let mut written = 0;
        for event in events {
            if !known.contains(&event.restaurant_id) {
                warn!(
                    "Menu sync: skipping event '{}' for unknown restaurant '{}'",
                    event.title, event.restaurant_id
                );
                continue;
            }
            if event.end < event.start {
                warn!("Menu sync: skipping event '{}' ending before it starts", event.title);
                continue;
            }

            sqlx::query(
                r#"INSERT INTO events
                       (title, restaurant_id, description, image_url, start_at, end_at)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   ON CONFLICT (title, restaurant_id, start_at) DO UPDATE SET
                       description = EXCLUDED.description,
                       image_url   = EXCLUDED.image_url,
                       end_at      = EXCLUDED.end_at,
                       updated_at  = NOW()"#,
            )
            .bind(&event.title)
            .bind(&event.restaurant_id)
            .bind(&event.description)
            .bind(&event.image_url)
            .bind(event.start)
            .bind(event.end)
            .execute(pool)
            .await?;
            written += 1;
        }

        SYNC_ROWS_COUNTER
            .with_label_values(&["events"])
            .inc_by(written as f64);
        Ok(written)
    }

    /// One sync pass. Failures of individual days are logged and reported,
    /// never retried; the rest of the pass carries on.
    pub async fn run(
        pool: &PgPool,
        source: &MenuSource,
        kind: SyncKind,
        start: NaiveDate,
        restaurants: &[String],
    ) -> anyhow::Result<SyncReport> {
        let targets = sync_targets(restaurants, start, kind.days())?;
        info!(
            "Menu sync ({}): {} restaurant-day(s) from {}",
            kind.label(),
            targets.len(),
            start
        );

        let fetched: Vec<_> = stream::iter(targets)
            .map(|(restaurant, date)| async move {
                let result = source.fetch_day(&restaurant, date).await;
                (restaurant, date, result)
            })
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut report = SyncReport::default();
        for (restaurant, date, result) in fetched {
            let applied = match result {
                Ok(day) => Self::apply(pool, &plan_day(&day)).await,
                Err(e) => Err(e),
            };
            match applied {
                Ok(counts) => {
                    report.days_synced += 1;
                    report.dishes_written += counts.dishes;
                    report.menus_written += counts.menus;
                }
                Err(e) => {
                    error!("Menu sync: {} on {} failed: {:#}", restaurant, date, e);
                    report.days_failed += 1;
                    report.failures.push(format!("{restaurant} {date}: {e}"));
                }
            }
        }

        if let SyncKind::Weekly { .. } = kind {
            match source.fetch_events().await {
                Ok(events) => match Self::upsert_events(pool, &events).await {
                    Ok(n) => report.events_written = n,
                    Err(e) => {
                        error!("Menu sync: writing events failed: {:#}", e);
                        report.failures.push(format!("events: {e}"));
                    }
                },
                Err(e) => {
                    error!("Menu sync: fetching events failed: {:#}", e);
                    report.failures.push(format!("events: {e}"));
                }
            }
        }

        let status = match (report.days_synced, report.failures.is_empty()) {
            (_, true) => "ok",
            (0, false) => "failed",
            (_, false) => "partial",
        };
        SYNC_RUNS_COUNTER
            .with_label_values(&[kind.label(), status])
            .inc();
        info!(
            "Menu sync ({}) {}: {} day(s) synced, {} failed, {} dish(es), {} menu(s), {} event(s)",
            kind.label(),
            status,
            report.days_synced,
            report.days_failed,
            report.dishes_written,
            report.menus_written,
            report.events_written
        );

        Ok(report)
    }
}

/// Every (restaurant, date) pair a pass covers, dates ascending per restaurant.
pub fn sync_targets(
    restaurants: &[String],
    start: NaiveDate,
    days: u32,
) -> Result<Vec<(String, NaiveDate)>, ServiceError> {
    let dates = (0..days)
        .map(|offset| start.checked_add_days(Days::new(offset.into())))
        .collect::<Option<Vec<NaiveDate>>>()
        .ok_or_else(|| {
            ServiceError::Validation(format!("{days} day(s) from {start} is out of range"))
        })?;

    Ok(restaurants
        .iter()
        .flat_map(|r| dates.iter().map(move |date| (r.clone(), *date)))
        .collect())
}

async fn upsert_dish(tx: &mut Transaction<'_, Postgres>, row: &DishRow) -> anyhow::Result<()> {
    let dish = &row.dish;
    // Rating aggregates belong to the application and are never overwritten.
    sqlx::query(
        r#"INSERT INTO dishes (id, station_id, name, description, category, ingredients,
                               serving_size, serving_unit, image_url)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
           ON CONFLICT (id) DO UPDATE SET
               station_id   = EXCLUDED.station_id,
               name         = EXCLUDED.name,
               description  = EXCLUDED.description,
               category     = EXCLUDED.category,
               ingredients  = EXCLUDED.ingredients,
               serving_size = EXCLUDED.serving_size,
               serving_unit = EXCLUDED.serving_unit,
               image_url    = EXCLUDED.image_url,
               updated_at   = NOW()"#,
    )
    .bind(&dish.id)
    .bind(&row.station_id)
    .bind(&dish.name)
    .bind(&dish.description)
    .bind(&dish.category)
    .bind(&dish.ingredients)
    .bind(&dish.serving_size)
    .bind(&dish.serving_unit)
    .bind(&dish.image_url)
    .execute(&mut **tx)
    .await?;

    let n = &dish.nutrition;
    sqlx::query(
        r#"INSERT INTO nutrition_infos (dish_id, calories, total_fat_g, trans_fat_g,
                   saturated_fat_g, cholesterol_mg, sodium_mg, total_carbs_g, dietary_fiber_g,
                   sugars_g, protein_g, vitamin_a_iu, vitamin_c_iu, calcium_mg, iron_mg)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
           ON CONFLICT (dish_id) DO UPDATE SET
               calories        = EXCLUDED.calories,
               total_fat_g     = EXCLUDED.total_fat_g,
               trans_fat_g     = EXCLUDED.trans_fat_g,
               saturated_fat_g = EXCLUDED.saturated_fat_g,
               cholesterol_mg  = EXCLUDED.cholesterol_mg,
               sodium_mg       = EXCLUDED.sodium_mg,
               total_carbs_g   = EXCLUDED.total_carbs_g,
               dietary_fiber_g = EXCLUDED.dietary_fiber_g,
               sugars_g        = EXCLUDED.sugars_g,
               protein_g       = EXCLUDED.protein_g,
               vitamin_a_iu    = EXCLUDED.vitamin_a_iu,
               vitamin_c_iu    = EXCLUDED.vitamin_c_iu,
               calcium_mg      = EXCLUDED.calcium_mg,
               iron_mg         = EXCLUDED.iron_mg,
               updated_at      = NOW()"#,
    )
    .bind(&dish.id)
    .bind(n.calories)
    .bind(n.total_fat_g)
    .bind(n.trans_fat_g)
    .bind(n.saturated_fat_g)
    .bind(n.cholesterol_mg)
    .bind(n.sodium_mg)
    .bind(n.total_carbs_g)
    .bind(n.dietary_fiber_g)
    .bind(n.sugars_g)
    .bind(n.protein_g)
    .bind(n.vitamin_a_iu)
    .bind(n.vitamin_c_iu)
    .bind(n.calcium_mg)
    .bind(n.iron_mg)
    .execute(&mut **tx)
    .await?;

    let r = &dish.restrictions;
    sqlx::query(
        r#"INSERT INTO diet_restrictions (dish_id, contains_eggs, contains_fish, contains_milk,
                   contains_peanuts, contains_sesame, contains_shellfish, contains_soy,
                   contains_tree_nuts, contains_wheat, is_gluten_free, is_halal, is_kosher,
                   is_locally_grown, is_organic, is_vegan, is_vegetarian)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
           ON CONFLICT (dish_id) DO UPDATE SET
               contains_eggs      = EXCLUDED.contains_eggs,
               contains_fish      = EXCLUDED.contains_fish,
               contains_milk      = EXCLUDED.contains_milk,
               contains_peanuts   = EXCLUDED.contains_peanuts,
               contains_sesame    = EXCLUDED.contains_sesame,
               contains_shellfish = EXCLUDED.contains_shellfish,
               contains_soy       = EXCLUDED.contains_soy,
               contains_tree_nuts = EXCLUDED.contains_tree_nuts,
               contains_wheat     = EXCLUDED.contains_wheat,
               is_gluten_free     = EXCLUDED.is_gluten_free,
               is_halal           = EXCLUDED.is_halal,
               is_kosher          = EXCLUDED.is_kosher,
               is_locally_grown   = EXCLUDED.is_locally_grown,
               is_organic         = EXCLUDED.is_organic,
               is_vegan           = EXCLUDED.is_vegan,
               is_vegetarian      = EXCLUDED.is_vegetarian,
               updated_at         = NOW()"#,
    )
    .bind(&dish.id)
    .bind(r.contains_eggs)
    .bind(r.contains_fish)
    .bind(r.contains_milk)
    .bind(r.contains_peanuts)
    .bind(r.contains_sesame)
    .bind(r.contains_shellfish)
    .bind(r.contains_soy)
    .bind(r.contains_tree_nuts)
    .bind(r.contains_wheat)
    .bind(r.is_gluten_free)
    .bind(r.is_halal)
    .bind(r.is_kosher)
    .bind(r.is_locally_grown)
    .bind(r.is_organic)
    .bind(r.is_vegan)
    .bind(r.is_vegetarian)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        dish::{DietRestriction, NutritionInfo},
        sync::{ScrapedDish, ScrapedPeriod, ScrapedRestaurant, ScrapedStation},
    };

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn dish(id: &str, name: &str) -> ScrapedDish {
        ScrapedDish {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: "Entree".into(),
            ingredients: None,
            serving_size: None,
            serving_unit: None,
            image_url: None,
            nutrition: NutritionInfo::default(),
            restrictions: DietRestriction::default(),
        }
    }

    fn station(id: &str, dishes: Vec<ScrapedDish>) -> ScrapedStation {
        ScrapedStation {
            id: id.into(),
            name: id.to_uppercase(),
            dishes,
        }
    }

    fn period(id: &str, name: &str, stations: Vec<ScrapedStation>) -> ScrapedPeriod {
        ScrapedPeriod {
            id: id.into(),
            name: name.into(),
            start_time: Some("0700".into()),
            end_time: Some("1100".into()),
            price: Some("$11.00".into()),
            stations,
        }
    }

    fn day(periods: Vec<ScrapedPeriod>) -> ScrapedDay {
        ScrapedDay {
            restaurant: ScrapedRestaurant {
                id: "brandywine".into(),
                name: "Brandywine".into(),
            },
            date: date(),
            periods,
        }
    }

    #[test]
    fn test_menu_id_is_natural_key() {
        assert_eq!(menu_id("anteatery", "107", date()), "anteatery-107-2025-03-04");
        assert_eq!(menu_id("anteatery", "107", date()), menu_id("anteatery", "107", date()));
    }

    #[test]
    fn test_plan_dedupes_shared_dishes_and_stations() {
        let scraped = day(vec![
            period(
                "49",
                "breakfast",
                vec![station("grill", vec![dish("1", "Eggs"), dish("2", "Bacon")])],
            ),
            period(
                "106",
                "lunch",
                vec![
                    station("grill", vec![dish("2", "Bacon Strips"), dish("3", "Burger")]),
                    station("deli", vec![dish("4", "Turkey Sandwich")]),
                ],
            ),
        ]);
        let plan = plan_day(&scraped);

        let station_ids: Vec<&str> = plan.stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(station_ids, vec!["deli", "grill"]);

        let dish_ids: Vec<&str> = plan.dishes.iter().map(|d| d.dish.id.as_str()).collect();
        assert_eq!(dish_ids, vec!["1", "2", "3", "4"]);
        // Later occurrences win.
        assert_eq!(plan.dishes[1].dish.name, "Bacon Strips");

        assert_eq!(plan.periods.len(), 2);
        assert_eq!(plan.menus.len(), 2);
        assert_eq!(plan.menus[0].id, "brandywine-106-2025-03-04");
        assert_eq!(plan.menus[0].dish_ids, vec!["2", "3", "4"]);
        assert_eq!(plan.menus[0].price.as_deref(), Some("$11.00"));
        assert_eq!(plan.menus[1].id, "brandywine-49-2025-03-04");
        assert_eq!(plan.menus[1].dish_ids, vec!["1", "2"]);
    }

    #[test]
    fn test_shared_rows_are_written_in_the_same_order() {
        let mut anteatery = day(vec![period(
            "107",
            "dinner",
            vec![
                station("oven", vec![dish("1", "Pizza"), dish("2", "Calzone")]),
                station("grill", vec![dish("3", "Burger")]),
            ],
        )]);
        anteatery.restaurant = ScrapedRestaurant {
            id: "anteatery".into(),
            name: "The Anteatery".into(),
        };
        let brandywine = day(vec![period(
            "107",
            "dinner",
            vec![
                station("grill", vec![dish("3", "Burger")]),
                station("oven", vec![dish("2", "Calzone"), dish("1", "Pizza")]),
            ],
        )]);

        let a = plan_day(&anteatery);
        let b = plan_day(&brandywine);

        let dish_order = |p: &SyncPlan| -> Vec<String> {
            p.dishes.iter().map(|d| d.dish.id.clone()).collect()
        };
        let station_order = |p: &SyncPlan| -> Vec<String> {
            p.stations.iter().map(|s| s.id.clone()).collect()
        };
        assert_eq!(dish_order(&a), vec!["1", "2", "3"]);
        assert_eq!(dish_order(&a), dish_order(&b));
        assert_eq!(station_order(&a), station_order(&b));
        assert_eq!(a.menus[0].dish_ids, b.menus[0].dish_ids);
    }

    #[test]
    fn test_plan_merges_repeated_period() {
        let scraped = day(vec![
            period("49", "breakfast", vec![station("grill", vec![dish("1", "Eggs")])]),
            period(
                "49",
                "breakfast",
                vec![station("grill", vec![dish("1", "Eggs"), dish("5", "Toast")])],
            ),
        ]);
        let plan = plan_day(&scraped);

        assert_eq!(plan.periods.len(), 1);
        assert_eq!(plan.menus.len(), 1);
        assert_eq!(plan.menus[0].dish_ids, vec!["1", "5"]);
    }

    #[test]
    fn test_plan_keeps_partial_period_times() {
        let mut p = period("2000", "latenight", vec![]);
        p.end_time = None;
        let plan = plan_day(&day(vec![p]));

        assert_eq!(plan.periods[0].start_time.as_deref(), Some("0700"));
        assert_eq!(plan.periods[0].end_time, None);
        assert!(plan.menus[0].dish_ids.is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let scraped = day(vec![period(
            "49",
            "breakfast",
            vec![station("grill", vec![dish("1", "Eggs")])],
        )]);
        assert_eq!(plan_day(&scraped), plan_day(&scraped));
    }

    #[test]
    fn test_sync_targets() {
        let restaurants = vec!["anteatery".to_string(), "brandywine".to_string()];
        let targets = sync_targets(&restaurants, date(), 2).unwrap();
        assert_eq!(
            targets,
            vec![
                ("anteatery".to_string(), date()),
                ("anteatery".to_string(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()),
                ("brandywine".to_string(), date()),
                ("brandywine".to_string(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()),
            ]
        );
        assert!(sync_targets(&restaurants, date(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_sync_targets_past_last_date_are_rejected() {
        let restaurants = vec!["anteatery".to_string()];
        assert_eq!(
            sync_targets(&restaurants, NaiveDate::MAX, 1).unwrap(),
            vec![("anteatery".to_string(), NaiveDate::MAX)]
        );
        assert!(matches!(
            sync_targets(&restaurants, NaiveDate::MAX, 2),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_scraped_day_deserializes_with_defaults() {
        let raw = r#"{
            "restaurant": { "id": "anteatery", "name": "The Anteatery" },
            "date": "2025-03-04",
            "periods": [{
                "id": "107", "name": "dinner", "start_time": "1630", "end_time": "2000",
                "price": null,
                "stations": [{ "id": "s1", "name": "Oven", "dishes": [
                    { "id": "d1", "name": "Pizza", "nutrition": { "calories": 280.0 },
                      "restrictions": { "is_vegetarian": true } }
                ]}]
            }]
        }"#;
        let parsed: ScrapedDay = serde_json::from_str(raw).unwrap();
        let dish = &parsed.periods[0].stations[0].dishes[0];
        assert_eq!(dish.nutrition.calories, Some(280.0));
        assert_eq!(dish.nutrition.protein_g, None);
        assert!(dish.restrictions.is_vegetarian);
        assert!(!dish.restrictions.is_vegan);
        assert_eq!(dish.description, "");
    }
}
