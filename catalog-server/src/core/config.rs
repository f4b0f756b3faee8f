//! Server configuration

use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::services::CatalogPolicy;

/// 服务器配置 - 目录、端口与策略项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、上传文件) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | IMAGE_REQUIRED | false | 创建商品时是否必须上传图片 |
/// | MIN_PRICE | 0 | 商品价格下限 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和上传的图片
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 创建商品时是否必须上传图片
    pub image_required: bool,
    /// 商品价格下限 (0 = 宽松, 0.01 = 严格)
    pub min_price: Decimal,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            image_required: std::env::var("IMAGE_REQUIRED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_price: std::env::var("MIN_PRICE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Decimal::ZERO),
        }
    }

    /// SQLite database file path
    pub fn database_path(&self) -> String {
        format!("{}/catalog.db", self.work_dir)
    }

    /// Uploads root directory
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    /// Catalog policy knobs derived from configuration
    pub fn policy(&self) -> CatalogPolicy {
        CatalogPolicy {
            image_required: self.image_required,
            min_price: self.min_price,
        }
    }
}
