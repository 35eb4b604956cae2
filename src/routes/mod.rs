pub mod admin;
pub mod dishes;
pub mod entries;
pub mod events;
pub mod favorites;
pub mod health;
pub mod meals;
pub mod metrics;
pub mod ratings;
pub mod restaurants;
