//! Catalog Server - 商品目录管理服务
//!
//! 提供层级商品分类和商品管理：分类支持父子层级，商品属于一个或多个
//! 分类 (可选图片)，并提供分页、可过滤的商品列表。
//!
//! # 模块结构
//!
//! ```text
//! catalog-server/src/
//! ├── core/          # 配置、状态
//! ├── services/      # 目录服务、图片存储
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 错误、日志、校验
//! └── db/            # 数据库层 (SQLite + 仓储)
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, ServerState};
pub use services::{CatalogPolicy, CatalogService, ImageStore, ImageUpload};
pub use utils::logger::{init_logger, init_logger_with_file};
pub use utils::{AppError, AppResult};
