use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use redis::Client as RedisClient;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peterplate_api::{
    config::Config,
    db,
    middleware::auth::JwtSecret,
    router,
    services::{metrics, sync::MenuSource, sync_scheduler},
    AppState,
};

/// Origins allowed to call the API: the web app itself, plus localhost for development.
fn origin_allowed(origin: &str, base_url: &str) -> bool {
    if origin.starts_with("http://localhost") || origin.starts_with("http://127.0.0.1") {
        return true;
    }
    origin == base_url.trim_end_matches('/')
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url, 20).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let redis_client = RedisClient::open(config.redis_url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_async_connection().await?;
    info!("Redis connected");

    let menu_source = MenuSource::new(&config.scraper_base_url);

    metrics::start(pool.clone());
    if config.sync_enabled {
        sync_scheduler::start(pool.clone(), menu_source.clone(), config.clone());
        info!(
            "Menu sync scheduled daily at {:02}:00 (weekly pass on {})",
            config.sync_hour, config.sync_weekly_day
        );
    } else {
        info!("SYNC_ENABLED not set, scheduled menu sync disabled");
    }

    let state = AppState {
        db: pool,
        redis: redis_conn,
        config: config.clone(),
        menu_source,
    };

    let base_url = config.app_base_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-admin-key"),
        ]))
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| origin_allowed(o, &base_url))
                .unwrap_or(false)
        }));

    let app = router()
        .layer(axum::Extension(JwtSecret(config.jwt_secret.clone())))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("PeterPlate API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_allowed() {
        let base = "https://peterplate.example.com/";
        assert!(origin_allowed("https://peterplate.example.com", base));
        assert!(origin_allowed("http://localhost:3000", base));
        assert!(!origin_allowed("https://evil.example.com", base));
    }
}
