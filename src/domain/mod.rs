pub mod event;
pub mod preference;
pub mod swipe;
pub mod types;
