pub mod config;
pub mod event;
pub mod preference;
pub mod swipe;
