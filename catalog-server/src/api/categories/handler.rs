//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{Category, CategoryCreate};

/// GET /api/categories - 获取分类层级 (根分类及其直接子分类)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.catalog.get_all_with_hierarchy().await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id} - 获取单个分类 (含直接子分类)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let category = state.catalog.get_category_with_children(id).await?;
    Ok(Json(category))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    let category = state.catalog.create_category(payload).await?;
    Ok(Json(category))
}
