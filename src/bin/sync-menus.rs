/// Run one menu synchronisation pass against the scraper.
/// For deployments that schedule the sync outside the API process
/// (e.g. cron: 0 3 * * * /app/sync-menus daily).
///
/// Usage: sync-menus daily  [--date YYYY-MM-DD] [--restaurant ID]...
///        sync-menus weekly [--date YYYY-MM-DD] [--days N] [--restaurant ID]...

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

use peterplate_api::{
    config::parse_list,
    models::sync::SyncKind,
    services::sync::{MenuSource, SyncService},
};

#[derive(Parser)]
#[command(name = "sync-menus", about = "Pull dining-hall menus and events into the database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Menus of a single date
    Daily(Target),
    /// Menus of several consecutive dates, plus upcoming events
    Weekly {
        #[command(flatten)]
        target: Target,
        /// Number of days to sync, starting at --date (1 to 31)
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

#[derive(Args)]
struct Target {
    /// First date to sync (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Restaurant to sync; repeat for several (defaults to SYNC_RESTAURANTS)
    #[arg(long = "restaurant")]
    restaurants: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let (kind, target) = match cli.command {
        Command::Daily(target) => (SyncKind::Daily, target),
        Command::Weekly { target, days } => (SyncKind::weekly(days)?, target),
    };

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;
    let scraper_url = std::env::var("SCRAPER_BASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8081".into());

    let restaurants = if target.restaurants.is_empty() {
        parse_list(
            &std::env::var("SYNC_RESTAURANTS")
                .unwrap_or_else(|_| "anteatery,brandywine".into()),
        )
    } else {
        target.restaurants
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let start = target.date.unwrap_or_else(|| Local::now().date_naive());
    let source = MenuSource::new(&scraper_url);

    tracing::info!("Starting {} menu sync from {}", kind.label(), start);
    let report = SyncService::run(&pool, &source, kind, start, &restaurants).await?;

    tracing::info!(
        "Menu sync done: {} day(s) synced, {} failed, {} dishes, {} menus, {} events",
        report.days_synced,
        report.days_failed,
        report.dishes_written,
        report.menus_written,
        report.events_written
    );
    for failure in &report.failures {
        tracing::error!("{}", failure);
    }

    if report.days_failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
