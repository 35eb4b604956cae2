pub mod auth;
pub mod dish;
pub mod entry;
pub mod event;
pub mod favorite;
pub mod meal;
pub mod menu;
pub mod rating;
pub mod restaurant;
pub mod sync;
