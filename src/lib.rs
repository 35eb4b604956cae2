// Library exports for the binaries and tests
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;

use config::Config;
use services::sync::MenuSource;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: redis::aio::MultiplexedConnection,
    pub config: Arc<Config>,
    pub menu_source: MenuSource,
}

/// All API routes, without the cross-cutting layers added by the `api` binary.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Menus
        .route("/restaurants", get(routes::restaurants::list_restaurants))
        .route("/restaurants/{id}/menus", get(routes::restaurants::get_menus))
        .route("/restaurants/{id}/status", get(routes::restaurants::get_status))
        .route("/dishes/{id}", get(routes::dishes::get_dish))
        .route("/events", get(routes::events::list_upcoming))
        // Signed-in user
        .route("/me/favorites", get(routes::favorites::list_favorites))
        .route(
            "/me/favorites/{dish_id}",
            put(routes::favorites::add_favorite).delete(routes::favorites::remove_favorite),
        )
        .route("/me/ratings", get(routes::ratings::list_rated))
        .route("/me/ratings/{dish_id}", put(routes::ratings::rate_dish))
        .route("/me/entries", get(routes::entries::list_entries))
        .route("/me/meals", get(routes::meals::list_meals).post(routes::meals::log_meal))
        .route("/me/meals/{id}", delete(routes::meals::delete_meal))
        .route("/me/nutrition", get(routes::meals::daily_nutrition))
        // Admin
        .route("/admin/sync", post(routes::admin::trigger_sync))
}
