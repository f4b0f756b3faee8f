//! Data models
//!
//! Shared between the catalog server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are unix millis.

pub mod category;
pub mod product;
pub mod product_category;

// Re-exports
pub use category::*;
pub use product::*;
pub use product_category::*;
