//! Category Repository

use super::{RepoError, RepoResult, Repository};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

const COLUMNS: &str = "id, name, parent_id, created_at, updated_at";

#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Root categories (no parent), insertion order
    pub async fn find_roots(&self) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM category WHERE parent_id IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Root categories with their direct children attached (one level only)
    pub async fn find_roots_with_children(&self) -> RepoResult<Vec<Category>> {
        let mut roots = self.find_roots().await?;
        if roots.is_empty() {
            return Ok(roots);
        }

        // Dynamic query: variable number of IN placeholders — keep as runtime query
        let placeholders = roots.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT {COLUMNS} FROM category WHERE parent_id IN ({placeholders}) ORDER BY id"
        );
        let mut query = sqlx::query_as::<_, Category>(&sql);
        for root in &roots {
            query = query.bind(root.id);
        }
        let children = query.fetch_all(&self.pool).await?;

        let mut by_parent: HashMap<i64, Vec<Category>> = HashMap::new();
        for child in children {
            if let Some(parent_id) = child.parent_id {
                by_parent.entry(parent_id).or_default().push(child);
            }
        }
        for root in &mut roots {
            root.children = by_parent.remove(&root.id).unwrap_or_default();
        }
        Ok(roots)
    }

    /// Find category by id with direct children eagerly attached
    pub async fn find_with_children(&self, id: i64) -> RepoResult<Option<Category>> {
        let Some(mut category) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        category.children = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM category WHERE parent_id = ? ORDER BY id"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(category))
    }

    /// Ancestor chain from nearest parent to root.
    ///
    /// A visited set turns a looping parent chain into `CycleDetected`
    /// instead of walking forever.
    pub async fn find_ancestors(&self, category: &Category) -> RepoResult<Vec<Category>> {
        let mut ancestors = Vec::new();
        let mut visited = HashSet::from([category.id]);
        let mut parent_id = category.parent_id;

        while let Some(id) = parent_id {
            if !visited.insert(id) {
                return Err(RepoError::CycleDetected(id));
            }
            match self.find_by_id(id).await? {
                Some(parent) => {
                    parent_id = parent.parent_id;
                    ancestors.push(parent);
                }
                None => break,
            }
        }
        Ok(ancestors)
    }
}

impl Repository<Category, CategoryCreate, CategoryUpdate> for CategoryRepository {
    async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM category ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Category>> {
        let category =
            sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM category WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(category)
    }

    async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        let now = shared::util::now_millis();
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO category (name, parent_id, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create category".into()))
    }

    async fn update(&self, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
        let now = shared::util::now_millis();
        let rows = sqlx::query(
            "UPDATE category SET name = COALESCE(?1, name), parent_id = COALESCE(?2, parent_id), updated_at = ?3 WHERE id = ?4",
        )
        .bind(data.name)
        .bind(data.parent_id)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Category {id} not found")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let rows = sqlx::query("DELETE FROM category WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(rows.rows_affected() > 0)
    }
}
