//! Shared types for the catalog server
//!
//! Data models and response structures shared between the server and API
//! consumers. DB row types derive `sqlx::FromRow` behind the `db` feature so
//! non-server consumers stay free of the database stack.

pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use types::PaginatedResponse;
