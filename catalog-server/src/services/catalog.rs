//! Catalog Service - cross-entity orchestration for categories and products
//!
//! The only place enforcing multi-entity invariants: parent existence on
//! category creation, category existence and image policy on product
//! creation, compensating image cleanup when the relational write fails.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::collections::HashSet;

use crate::db::repository::{CategoryRepository, ProductRepository, RepoError, RepoResult, Repository};
use crate::services::{ImageStore, ImageUpload};
use crate::utils::types::ProductFilters;
use crate::utils::validation::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::PaginatedResponse;
use shared::models::{Category, CategoryCreate, Product, ProductCreate};

/// Policy knobs that vary between boundary variants.
///
/// The HTTP form boundary historically required an image and accepted a
/// zero price; the command-line boundary accepted a pathless product but
/// insisted on a positive price. Both stay available as configuration.
#[derive(Debug, Clone)]
pub struct CatalogPolicy {
    /// Require an image on product creation
    pub image_required: bool,
    /// Minimum accepted price
    pub min_price: Decimal,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            image_required: false,
            min_price: Decimal::ZERO,
        }
    }
}

/// Catalog service for category and product management
#[derive(Clone)]
pub struct CatalogService {
    categories: CategoryRepository,
    products: ProductRepository,
    images: ImageStore,
    policy: CatalogPolicy,
}

impl CatalogService {
    pub fn new(pool: SqlitePool, images: ImageStore, policy: CatalogPolicy) -> Self {
        Self {
            categories: CategoryRepository::new(pool.clone()),
            products: ProductRepository::new(pool),
            images,
            policy,
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category.
    ///
    /// A submitted parent must resolve; a dangling parent id is a business
    /// rule violation, not a storage error, and performs no write.
    pub async fn create_category(&self, data: CategoryCreate) -> AppResult<Category> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;

        if let Some(parent_id) = data.parent_id
            && self.categories.find_by_id(parent_id).await?.is_none()
        {
            return Err(AppError::business_rule("Parent category not found"));
        }

        let category = self.categories.create(data).await?;
        tracing::info!(id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Root categories with their direct children attached (one level)
    pub async fn get_all_with_hierarchy(&self) -> AppResult<Vec<Category>> {
        Ok(self.categories.find_roots_with_children().await?)
    }

    /// Category by id with direct children attached
    pub async fn get_category_with_children(&self, id: i64) -> AppResult<Category> {
        self.categories
            .find_with_children(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    /// Ancestor chain for a category, nearest parent first
    pub async fn get_ancestors(&self, category_id: i64) -> AppResult<Vec<Category>> {
        let category = self
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {category_id} not found")))?;
        Ok(self.categories.find_ancestors(&category).await?)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product with its category associations as one logical
    /// operation.
    ///
    /// The image (when supplied) goes to durable storage first; the guard
    /// removes it again on any exit path where the relational write did not
    /// commit. When image storage itself fails, nothing is written.
    pub async fn create_product(
        &self,
        mut data: ProductCreate,
        upload: Option<ImageUpload>,
    ) -> AppResult<Product> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;
        if data.price < self.policy.min_price {
            return Err(AppError::validation(format!(
                "price must be at least {}",
                self.policy.min_price
            )));
        }
        if data.categories.is_empty() {
            return Err(AppError::validation(
                "At least one category must be selected",
            ));
        }
        data.categories.sort_unstable();
        data.categories.dedup();
        for category_id in &data.categories {
            if self.categories.find_by_id(*category_id).await?.is_none() {
                return Err(AppError::validation(
                    "One or more selected categories are invalid",
                ));
            }
        }
        if upload.is_none() && self.policy.image_required {
            return Err(AppError::validation("image is required"));
        }

        let guard = match upload {
            Some(upload) => Some(self.images.store(upload)?),
            None => None,
        };
        data.image = guard.as_ref().map(|g| g.relative_path().to_string());

        match self.persist_product(data).await {
            Ok(product) => {
                if let Some(guard) = guard {
                    guard.commit();
                }
                tracing::info!(id = product.id, name = %product.name, "Product created");
                Ok(product)
            }
            // The guard drops here and removes the orphaned image
            Err(e) => Err(e.into()),
        }
    }

    async fn persist_product(&self, data: ProductCreate) -> RepoResult<Product> {
        let category_ids = data.categories.clone();
        let product = self.products.create(data).await?;
        self.products
            .sync_categories(product.id, &category_ids)
            .await?;
        self.products
            .find_with_categories(product.id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to load created product".into()))
    }

    /// Filtered, paginated listing (pass-through to the store)
    pub async fn get_paginated_with_filters(
        &self,
        filters: &ProductFilters,
    ) -> AppResult<PaginatedResponse<Product>> {
        Ok(self.products.find_paginated(filters).await?)
    }

    /// Product by id with categories eagerly loaded
    pub async fn find_with_categories(&self, id: i64) -> AppResult<Option<Product>> {
        Ok(self.products.find_with_categories(id).await?)
    }

    /// Associated categories plus each one's ancestors, deduplicated by id
    pub async fn product_category_trail(&self, product_id: i64) -> AppResult<Vec<Category>> {
        let product = self
            .products
            .find_with_categories(product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {product_id} not found")))?;

        let mut seen = HashSet::new();
        let mut trail = Vec::new();
        for category in &product.categories {
            if seen.insert(category.id) {
                trail.push(category.clone());
            }
        }
        for category in &product.categories {
            for ancestor in self.categories.find_ancestors(category).await? {
                if seen.insert(ancestor.id) {
                    trail.push(ancestor);
                }
            }
        }
        Ok(trail)
    }

    /// Delete a product and its stored image.
    ///
    /// Returns `false` when the id does not resolve. Image removal is
    /// fire-and-forget: a failed file delete never blocks the row delete.
    pub async fn delete_product(&self, id: i64) -> AppResult<bool> {
        let Some(product) = self.products.find_by_id(id).await? else {
            return Ok(false);
        };
        if let Some(image) = &product.image {
            self.images.delete(image);
        }
        let deleted = self.products.delete(id).await?;
        if deleted {
            tracing::info!(id, "Product deleted");
        }
        Ok(deleted)
    }
}
