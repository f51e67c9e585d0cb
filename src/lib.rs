//! Swipe classification and event ledger for the Godo event-discovery app.
//!
//! Gestures are classified into directions by [`gesture`], recorded in a
//! per-user ledger through the [`services`] layer and projected into the
//! going, public, saved and pass buckets on demand. Persistence sits behind
//! the traits in [`repository`], implemented for SQLite (Diesel) and for
//! process memory.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod gesture;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "data")]
pub mod services;
