//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Category;

/// Product entity
///
/// `price` carries 2-decimal fixed-point semantics; the database stores
/// integer cents and the repository converts at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Stored image path (`products/<uuid>.<ext>`), `None` when no image
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code) --

    /// Associated categories (junction table)
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Product {
    /// Resolvable URL for the stored image
    pub fn image_url(&self) -> Option<String> {
        self.image.as_ref().map(|path| format!("/api/image/{path}"))
    }
}

/// Create product payload
///
/// `image` is filled in by the service after the upload has been stored;
/// boundary callers submit the file separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub categories: Vec<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_points_at_the_serving_route() {
        let mut product = Product {
            id: 1,
            name: "X".to_string(),
            description: "d".to_string(),
            price: Decimal::new(99999, 2),
            image: Some("products/abc.png".to_string()),
            created_at: 0,
            updated_at: 0,
            categories: Vec::new(),
        };
        assert_eq!(
            product.image_url().as_deref(),
            Some("/api/image/products/abc.png")
        );

        product.image = None;
        assert_eq!(product.image_url(), None);
    }
}

