use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_gauge_vec, Counter,
    CounterVec, Gauge, GaugeVec,
};
use sqlx::PgPool;
use tracing::{info, warn};

lazy_static! {
    // ── Event counters (increment on each event) ────────────────────────────
    pub static ref SYNC_RUNS_COUNTER: CounterVec = register_counter_vec!(
        "api_menu_sync_runs_total",
        "Menu sync runs by kind and outcome",
        &["kind", "status"]
    ).unwrap();

    pub static ref SYNC_ROWS_COUNTER: CounterVec = register_counter_vec!(
        "api_menu_sync_rows_total",
        "Rows upserted by the menu sync, per table",
        &["table"]
    ).unwrap();

    pub static ref RATINGS_COUNTER: CounterVec = register_counter_vec!(
        "api_ratings_total",
        "Rating writes by action (create, update, clear)",
        &["action"]
    ).unwrap();

    pub static ref FAVORITES_COUNTER: CounterVec = register_counter_vec!(
        "api_favorites_total",
        "Favorite writes by action (add, remove)",
        &["action"]
    ).unwrap();

    pub static ref MEALS_LOGGED_COUNTER: Counter = register_counter!(
        "api_meals_logged_total",
        "Meals logged in the nutrition tracker"
    ).unwrap();

    // ── Business metrics ────────────────────────────────────────────────────
    pub static ref DISHES_GAUGE: GaugeVec = register_gauge_vec!(
        "peterplate_dishes_total",
        "Known dishes per restaurant",
        &["restaurant"]
    ).unwrap();

    pub static ref USERS_GAUGE: Gauge = register_gauge!(
        "peterplate_users_total",
        "Users who have rated, favorited or logged a dish"
    ).unwrap();

    pub static ref RATINGS_GAUGE: Gauge = register_gauge!(
        "peterplate_ratings_total",
        "Stored dish ratings"
    ).unwrap();

    pub static ref UPCOMING_EVENTS_GAUGE: Gauge = register_gauge!(
        "peterplate_upcoming_events_total",
        "Events that have not ended yet"
    ).unwrap();
}

/// Spawn the background metrics collector (refreshes every 5 minutes).
pub fn start(pool: PgPool) {
    tokio::spawn(async move {
        // Initial collection on startup
        if let Err(e) = collect(&pool).await {
            warn!("Metrics: initial collection failed: {}", e);
        }
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
            if let Err(e) = collect(&pool).await {
                warn!("Metrics: collection failed: {}", e);
            }
        }
    });
}

async fn collect(pool: &PgPool) -> anyhow::Result<()> {
    let dishes: Vec<(String, i64)> = sqlx::query_as(
        r#"SELECT s.restaurant_id, COUNT(*)::BIGINT
           FROM dishes d JOIN stations s ON s.id = d.station_id
           GROUP BY s.restaurant_id"#,
    )
    .fetch_all(pool)
    .await?;
    for (restaurant, count) in &dishes {
        DISHES_GAUGE.with_label_values(&[restaurant.as_str()]).set(*count as f64);
    }

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM users")
        .fetch_one(pool)
        .await
        .unwrap_or(0);
    USERS_GAUGE.set(users as f64);

    let ratings: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM ratings")
        .fetch_one(pool)
        .await
        .unwrap_or(0);
    RATINGS_GAUGE.set(ratings as f64);

    let events: i64 =
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM events WHERE end_at >= NOW()")
            .fetch_one(pool)
            .await
            .unwrap_or(0);
    UPCOMING_EVENTS_GAUGE.set(events as f64);

    info!("Metrics: collected for {} restaurant(s)", dishes.len());
    Ok(())
}
