use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, Timelike, Weekday};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::sync::SyncKind;
use crate::services::sync::{MenuSource, SyncService};

/// Seconds from `secs_today` (seconds since local midnight) until `hour`:00,
/// rolling over to tomorrow once the hour has passed.
pub fn secs_until_hour(secs_today: u32, hour: u32) -> u64 {
    let target_secs = hour * 3600;
    if secs_today < target_secs {
        (target_secs - secs_today) as u64
    } else {
        (86400 - secs_today + target_secs) as u64
    }
}

/// Weekly pass on the configured weekday, daily pass otherwise.
pub fn kind_for(today: NaiveDate, weekly_day: Weekday, weekly_days: u32) -> SyncKind {
    if today.weekday() == weekly_day {
        SyncKind::Weekly { days: weekly_days }
    } else {
        SyncKind::Daily
    }
}

/// Spawn a background task that wakes up daily at `config.sync_hour` and
/// pulls menus from the scraper. Runs are not coordinated across instances;
/// the writes are upserts, so overlapping runs converge.
pub fn start(pool: PgPool, source: MenuSource, config: Arc<Config>) {
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let secs_today = now.hour() * 3600 + now.minute() * 60 + now.second();
            let sleep_secs = secs_until_hour(secs_today, config.sync_hour);
            tokio::time::sleep(tokio::time::Duration::from_secs(sleep_secs)).await;

            let today = Local::now().date_naive();
            let kind = kind_for(today, config.sync_weekly_day, config.sync_weekly_days);
            info!("Menu sync scheduler: starting {} pass for {}", kind.label(), today);

            match SyncService::run(&pool, &source, kind, today, &config.sync_restaurants).await {
                Ok(report) if report.failures.is_empty() => {}
                Ok(report) => warn!(
                    "Menu sync scheduler: {} pass finished with {} failure(s)",
                    kind.label(),
                    report.failures.len()
                ),
                Err(e) => warn!("Menu sync scheduler: {} pass failed: {}", kind.label(), e),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_until_hour() {
        // 01:00 → 03:00
        assert_eq!(secs_until_hour(3600, 3), 7200);
        // exactly 03:00 waits a full day
        assert_eq!(secs_until_hour(3 * 3600, 3), 86400);
        // 23:00 → 03:00 tomorrow
        assert_eq!(secs_until_hour(23 * 3600, 3), 4 * 3600);
    }

    #[test]
    fn test_kind_for() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(kind_for(sunday, Weekday::Sun, 7), SyncKind::Weekly { days: 7 });
        assert_eq!(kind_for(monday, Weekday::Sun, 7), SyncKind::Daily);
    }
}
