//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
///
/// Categories form a self-referential hierarchy: `parent_id` points at the
/// parent category, `None` marks a root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Direct children (one level, not the full subtree)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub children: Vec<Category>,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub parent_id: Option<i64>,
}

/// Update category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub parent_id: Option<i64>,
}
