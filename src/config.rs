use std::env;

use chrono::Weekday;

use crate::models::sync::SyncKind;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
    pub admin_key: String,
    // Menu synchronisation
    pub scraper_base_url: String,
    pub sync_enabled: bool,
    pub sync_hour: u32,
    pub sync_weekly_day: Weekday,
    pub sync_weekly_days: u32,
    pub sync_restaurants: Vec<String>,
    /// Maximum rating writes per user per minute.
    pub rating_rate_limit: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let sync_hour: u32 = env::var("SYNC_HOUR")
            .unwrap_or_else(|_| "3".into())
            .parse()?;
        anyhow::ensure!(sync_hour < 24, "SYNC_HOUR must be between 0 and 23");

        let sync_weekly_days = parse_weekly_days(
            &env::var("SYNC_WEEKLY_DAYS").unwrap_or_else(|_| "7".into()),
        )?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
            jwt_secret: required("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            admin_key: env::var("ADMIN_KEY")
                .unwrap_or_else(|_| "change_this_admin_key".into()),
            scraper_base_url: env::var("SCRAPER_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8081".into()),
            sync_enabled: parse_flag(&env::var("SYNC_ENABLED").unwrap_or_default()),
            sync_hour,
            sync_weekly_day: env::var("SYNC_WEEKLY_DAY")
                .unwrap_or_else(|_| "sun".into())
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid SYNC_WEEKLY_DAY"))?,
            sync_weekly_days,
            sync_restaurants: parse_list(
                &env::var("SYNC_RESTAURANTS").unwrap_or_else(|_| "anteatery,brandywine".into()),
            ),
            rating_rate_limit: env::var("RATING_RATE_LIMIT")
                .unwrap_or_else(|_| "30".into())
                .parse()?,
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Span of the scheduled weekly pass, held to the same bounds as every other entry point.
fn parse_weekly_days(raw: &str) -> anyhow::Result<u32> {
    let days: u32 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid SYNC_WEEKLY_DAYS: {raw}"))?;
    let kind = SyncKind::weekly(days)
        .map_err(|e| anyhow::anyhow!("Invalid SYNC_WEEKLY_DAYS: {e}"))?;
    Ok(kind.days())
}

/// Comma-separated list, blanks dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
