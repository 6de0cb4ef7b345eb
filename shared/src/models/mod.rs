//! Data models
//!
//! Shared between aurum-server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod amount;
pub mod expense;
pub mod order;
pub mod page;
pub mod report;
pub mod shift;

// Re-exports
pub use amount::*;
pub use expense::*;
pub use order::*;
pub use page::*;
pub use report::*;
pub use shift::*;
