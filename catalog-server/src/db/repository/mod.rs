//! Repository Module
//!
//! CRUD operations over the SQLite pool plus entity-specific query
//! extensions (hierarchy walks, filtered pagination, association sync).

pub mod category;
pub mod product;

// Re-exports
pub use category::CategoryRepository;
pub use product::ProductRepository;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Category parent chain loops back on itself
    #[error("Category hierarchy cycle detected at category {0}")]
    CycleDetected(i64),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Common repository trait for basic CRUD
#[allow(async_fn_in_trait)]
pub trait Repository<T, CreateDto, UpdateDto> {
    async fn find_all(&self) -> RepoResult<Vec<T>>;
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<T>>;
    async fn create(&self, data: CreateDto) -> RepoResult<T>;
    async fn update(&self, id: i64, data: UpdateDto) -> RepoResult<T>;
    async fn delete(&self, id: i64) -> RepoResult<bool>;
}
