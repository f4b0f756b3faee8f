//! Product-Category Association Model

use serde::{Deserialize, Serialize};

/// Association row between a product and a category
///
/// Unique on the `(product_id, category_id)` pair. Rows untouched by a sync
/// keep their original timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductCategory {
    pub product_id: i64,
    pub category_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
