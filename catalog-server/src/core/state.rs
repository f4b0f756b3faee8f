//! Server state

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::services::{CatalogService, ImageStore};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 语义的浅拷贝组件 (pool, services)，Clone 成本极低。
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 图片存储
    pub images: ImageStore,
    /// 目录服务
    pub catalog: CatalogService,
}

impl ServerState {
    /// Build the full service graph from configuration
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.database_path()).await?;
        let images = ImageStore::new(config.uploads_dir());
        let catalog = CatalogService::new(db.pool.clone(), images.clone(), config.policy());

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            images,
            catalog,
        })
    }
}
