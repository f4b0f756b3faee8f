//! Product Repository

use super::{RepoError, RepoResult, Repository};
use crate::utils::types::{PriceSort, ProductFilters};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::PaginatedResponse;
use shared::models::{Category, Product, ProductCreate, ProductUpdate};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

const COLUMNS: &str = "id, name, description, price_cents, image, created_at, updated_at";

/// DB row — prices live as integer cents in SQLite
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price_cents: i64,
    image: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl ProductRow {
    fn into_product(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: Decimal::new(self.price_cents, 2),
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
            categories: Vec::new(),
        }
    }
}

/// Convert a 2-decimal price into integer cents for storage
fn price_to_cents(price: Decimal) -> RepoResult<i64> {
    (price.round_dp(2) * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| RepoError::Validation(format!("Price out of range: {price}")))
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find product by id with associated categories eagerly attached
    pub async fn find_with_categories(&self, id: i64) -> RepoResult<Option<Product>> {
        let Some(product) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let mut products = vec![product];
        self.attach_categories(&mut products).await?;
        Ok(products.pop())
    }

    /// Filtered, paginated listing.
    ///
    /// `category_id` restricts to products associated with that exact
    /// category (no descendant expansion). Price ordering is applied only
    /// when a sort was requested; anything other than `desc` sorts
    /// ascending. Filters compose with AND semantics.
    pub async fn find_paginated(
        &self,
        filters: &ProductFilters,
    ) -> RepoResult<PaginatedResponse<Product>> {
        let filter_sql = if filters.category_id.is_some() {
            " WHERE EXISTS (SELECT 1 FROM product_category pc WHERE pc.product_id = product.id AND pc.category_id = ?)"
        } else {
            ""
        };

        let count_sql = format!("SELECT COUNT(*) FROM product{filter_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(category_id) = filters.category_id {
            count_query = count_query.bind(category_id);
        }
        let total = count_query.fetch_one(&self.pool).await? as u64;

        let order_sql = match filters.price_sort() {
            Some(PriceSort::Desc) => " ORDER BY price_cents DESC, id",
            Some(PriceSort::Asc) => " ORDER BY price_cents ASC, id",
            None => " ORDER BY id",
        };
        let select_sql =
            format!("SELECT {COLUMNS} FROM product{filter_sql}{order_sql} LIMIT ? OFFSET ?");
        let mut query = sqlx::query_as::<_, ProductRow>(&select_sql);
        if let Some(category_id) = filters.category_id {
            query = query.bind(category_id);
        }
        let rows = query
            .bind(filters.limit() as i64)
            .bind(filters.offset())
            .fetch_all(&self.pool)
            .await?;

        let mut products: Vec<Product> = rows.into_iter().map(ProductRow::into_product).collect();
        self.attach_categories(&mut products).await?;

        Ok(PaginatedResponse::new(
            products,
            total,
            filters.current_page(),
            filters.limit(),
        ))
    }

    /// Replace the product's association set with exactly `category_ids`.
    ///
    /// Returns `false` when the product does not resolve. Set-difference:
    /// missing pairs are inserted, removed pairs deleted, unchanged rows are
    /// left alone so their timestamps survive. Duplicate ids collapse.
    pub async fn sync_categories(&self, product_id: i64, category_ids: &[i64]) -> RepoResult<bool> {
        if self.find_by_id(product_id).await?.is_none() {
            return Ok(false);
        }

        let target: HashSet<i64> = category_ids.iter().copied().collect();
        let existing: HashSet<i64> = sqlx::query_scalar::<_, i64>(
            "SELECT category_id FROM product_category WHERE product_id = ?",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .collect();

        let now = shared::util::now_millis();
        for category_id in target.difference(&existing) {
            sqlx::query(
                "INSERT INTO product_category (product_id, category_id, created_at, updated_at) VALUES (?, ?, ?, ?)",
            )
            .bind(product_id)
            .bind(*category_id)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        }
        for category_id in existing.difference(&target) {
            sqlx::query("DELETE FROM product_category WHERE product_id = ? AND category_id = ?")
                .bind(product_id)
                .bind(*category_id)
                .execute(&self.pool)
                .await?;
        }
        Ok(true)
    }

    /// Attach associated categories to each product (single IN query)
    async fn attach_categories(&self, products: &mut [Product]) -> RepoResult<()> {
        if products.is_empty() {
            return Ok(());
        }

        #[derive(sqlx::FromRow)]
        struct AssociationRow {
            product_id: i64,
            id: i64,
            name: String,
            parent_id: Option<i64>,
            created_at: i64,
            updated_at: i64,
        }

        let placeholders = products.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT pc.product_id AS product_id, c.id AS id, c.name AS name, c.parent_id AS parent_id, c.created_at AS created_at, c.updated_at AS updated_at \
             FROM product_category pc JOIN category c ON c.id = pc.category_id \
             WHERE pc.product_id IN ({placeholders}) ORDER BY pc.product_id, c.id"
        );
        let mut query = sqlx::query_as::<_, AssociationRow>(&sql);
        for product in products.iter() {
            query = query.bind(product.id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_product: HashMap<i64, Vec<Category>> = HashMap::new();
        for row in rows {
            by_product.entry(row.product_id).or_default().push(Category {
                id: row.id,
                name: row.name,
                parent_id: row.parent_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
                children: Vec::new(),
            });
        }
        for product in products.iter_mut() {
            product.categories = by_product.remove(&product.id).unwrap_or_default();
        }
        Ok(())
    }
}

impl Repository<Product, ProductCreate, ProductUpdate> for ProductRepository {
    async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let rows =
            sqlx::query_as::<_, ProductRow>(&format!("SELECT {COLUMNS} FROM product ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Product>> {
        let row =
            sqlx::query_as::<_, ProductRow>(&format!("SELECT {COLUMNS} FROM product WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(ProductRow::into_product))
    }

    /// Persist core product fields. Association sync is a separate operation.
    async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let price_cents = price_to_cents(data.price)?;
        let now = shared::util::now_millis();
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO product (name, description, price_cents, image, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(price_cents)
        .bind(&data.image)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create product".into()))
    }

    async fn update(&self, id: i64, data: ProductUpdate) -> RepoResult<Product> {
        let price_cents = data.price.map(price_to_cents).transpose()?;
        let now = shared::util::now_millis();
        let rows = sqlx::query(
            "UPDATE product SET name = COALESCE(?1, name), description = COALESCE(?2, description), price_cents = COALESCE(?3, price_cents), image = COALESCE(?4, image), updated_at = ?5 WHERE id = ?6",
        )
        .bind(data.name)
        .bind(data.description)
        .bind(price_cents)
        .bind(data.image)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Product {id} not found")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    /// Returns `false` when the product does not exist rather than failing
    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let rows = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(rows.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::CategoryRepository;
    use crate::db::test_pool;
    use shared::models::CategoryCreate;

    async fn repos() -> (ProductRepository, CategoryRepository, SqlitePool) {
        let pool = test_pool().await;
        (
            ProductRepository::new(pool.clone()),
            CategoryRepository::new(pool.clone()),
            pool,
        )
    }

    async fn seed_category(categories: &CategoryRepository, name: &str) -> i64 {
        categories
            .create(CategoryCreate {
                name: name.to_string(),
                parent_id: None,
            })
            .await
            .unwrap()
            .id
    }

    fn product(name: &str, price: &str) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            description: format!("{name} description"),
            price: price.parse().unwrap(),
            image: None,
            categories: Vec::new(),
        }
    }

    async fn association_set(pool: &SqlitePool, product_id: i64) -> HashSet<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT category_id FROM product_category WHERE product_id = ?",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
        .unwrap()
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn price_round_trips_with_two_decimals() {
        let (products, _, _) = repos().await;
        let created = products.create(product("X", "999.99")).await.unwrap();
        assert_eq!(created.price, "999.99".parse::<Decimal>().unwrap());

        let fetched = products.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.price, created.price);

        let updated = products
            .update(
                created.id,
                ProductUpdate {
                    name: None,
                    description: None,
                    price: Some("10.50".parse().unwrap()),
                    image: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, "10.50".parse::<Decimal>().unwrap());
        assert_eq!(products.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sync_replaces_association_set() {
        let (products, categories, pool) = repos().await;
        let c1 = seed_category(&categories, "One").await;
        let c2 = seed_category(&categories, "Two").await;
        let c3 = seed_category(&categories, "Three").await;
        let p = products.create(product("P", "10.00")).await.unwrap();

        assert!(products.sync_categories(p.id, &[c1, c2]).await.unwrap());
        assert_eq!(association_set(&pool, p.id).await, HashSet::from([c1, c2]));

        // Pin a known timestamp on the surviving pair
        sqlx::query(
            "UPDATE product_category SET created_at = 123 WHERE product_id = ? AND category_id = ?",
        )
        .bind(p.id)
        .bind(c2)
        .execute(&pool)
        .await
        .unwrap();

        assert!(products.sync_categories(p.id, &[c2, c3]).await.unwrap());
        assert_eq!(association_set(&pool, p.id).await, HashSet::from([c2, c3]));

        // The unchanged pair kept its original timestamps
        let kept: i64 = sqlx::query_scalar(
            "SELECT created_at FROM product_category WHERE product_id = ? AND category_id = ?",
        )
        .bind(p.id)
        .bind(c2)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(kept, 123);
    }

    #[tokio::test]
    async fn sync_collapses_duplicates_and_reports_missing_product() {
        let (products, categories, pool) = repos().await;
        let c1 = seed_category(&categories, "One").await;
        let p = products.create(product("P", "1.00")).await.unwrap();

        assert!(products.sync_categories(p.id, &[c1, c1]).await.unwrap());
        assert_eq!(association_set(&pool, p.id).await.len(), 1);

        assert!(!products.sync_categories(9999, &[c1]).await.unwrap());
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_category")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn category_filter_matches_exact_associations_only() {
        let (products, categories, _) = repos().await;
        let a = seed_category(&categories, "A").await;
        let b = seed_category(&categories, "B").await;

        let p1 = products.create(product("P1", "5.00")).await.unwrap();
        products.sync_categories(p1.id, &[a]).await.unwrap();
        let p2 = products.create(product("P2", "6.00")).await.unwrap();
        products.sync_categories(p2.id, &[a, b]).await.unwrap();

        let filters = ProductFilters {
            category_id: Some(b),
            ..Default::default()
        };
        let page = products.find_paginated(&filters).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].id, p2.id);

        let filters = ProductFilters {
            category_id: Some(a),
            ..Default::default()
        };
        let page = products.find_paginated(&filters).await.unwrap();
        let ids: Vec<i64> = page.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![p1.id, p2.id]);
    }

    #[tokio::test]
    async fn price_sort_desc_and_unrecognized_fallback() {
        let (products, _, _) = repos().await;
        products.create(product("Mid", "7.25")).await.unwrap();
        products.create(product("High", "10.00")).await.unwrap();
        products.create(product("Low", "5.50")).await.unwrap();

        let filters = ProductFilters {
            sort_price: Some("DESC".to_string()),
            ..Default::default()
        };
        let page = products.find_paginated(&filters).await.unwrap();
        let prices: Vec<Decimal> = page.data.iter().map(|p| p.price).collect();
        assert!(prices.windows(2).all(|w| w[0] >= w[1]));

        // Anything the store does not recognize falls back to ascending
        let filters = ProductFilters {
            sort_price: Some("sideways".to_string()),
            ..Default::default()
        };
        let page = products.find_paginated(&filters).await.unwrap();
        let prices: Vec<Decimal> = page.data.iter().map(|p| p.price).collect();
        assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn pagination_defaults_to_fifteen_per_page() {
        let (products, _, _) = repos().await;
        for i in 0..16 {
            products
                .create(product(&format!("P{i}"), "1.00"))
                .await
                .unwrap();
        }

        let page = products
            .find_paginated(&ProductFilters::default())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 15);
        assert_eq!(page.total, 16);
        assert_eq!(page.limit, 15);
        assert_eq!(page.total_pages, 2);

        let filters = ProductFilters {
            page: Some(2),
            ..Default::default()
        };
        let page2 = products.find_paginated(&filters).await.unwrap();
        assert_eq!(page2.data.len(), 1);
        assert_eq!(page2.page, 2);
    }

    #[tokio::test]
    async fn listing_eager_loads_categories() {
        let (products, categories, _) = repos().await;
        let a = seed_category(&categories, "A").await;
        let p = products.create(product("P", "2.00")).await.unwrap();
        products.sync_categories(p.id, &[a]).await.unwrap();

        let page = products
            .find_paginated(&ProductFilters::default())
            .await
            .unwrap();
        assert_eq!(page.data[0].categories.len(), 1);
        assert_eq!(page.data[0].categories[0].id, a);

        let full = products.find_with_categories(p.id).await.unwrap().unwrap();
        assert_eq!(full.categories[0].id, a);
    }

    #[tokio::test]
    async fn delete_reports_missing_and_cascades_associations() {
        let (products, categories, pool) = repos().await;
        let a = seed_category(&categories, "A").await;
        let p = products.create(product("P", "3.00")).await.unwrap();
        products.sync_categories(p.id, &[a]).await.unwrap();

        assert!(!products.delete(9999).await.unwrap());

        assert!(products.delete(p.id).await.unwrap());
        assert!(products.find_by_id(p.id).await.unwrap().is_none());
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_category")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
