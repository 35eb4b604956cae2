pub mod dishes;
pub mod entries;
pub mod events;
pub mod favorites;
pub mod hall_status;
pub mod meals;
pub mod menus;
pub mod metrics;
pub mod ratings;
pub mod sync;
pub mod sync_scheduler;
pub mod users;
