//! Product API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use rust_decimal::Decimal;

use crate::core::ServerState;
use crate::services::ImageUpload;
use crate::utils::types::ProductFilters;
use crate::utils::{AppError, AppResult};
use shared::PaginatedResponse;
use shared::models::{Category, Product, ProductCreate};

/// GET /api/products - 分页商品列表 (可按分类过滤、按价格排序)
pub async fn list(
    State(state): State<ServerState>,
    Query(filters): Query<ProductFilters>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    let page = state.catalog.get_paginated_with_filters(&filters).await?;
    Ok(Json(page))
}

/// GET /api/products/{id} - 获取单个商品 (含所属分类)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = state
        .catalog
        .find_with_categories(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;
    Ok(Json(product))
}

/// GET /api/products/{id}/categories - 所属分类及其全部祖先分类
pub async fn category_trail(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Category>>> {
    let trail = state.catalog.product_category_trail(id).await?;
    Ok(Json(trail))
}

/// POST /api/products - 创建商品 (multipart 表单)
///
/// Fields: `name`, `description`, `price`, repeated `categories`,
/// optional file part `image`.
pub async fn create(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<Product>> {
    let mut name = None;
    let mut description = None;
    let mut price = None;
    let mut categories: Vec<i64> = Vec::new();
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await?),
            Some("description") => description = Some(field.text().await?),
            Some("price") => price = Some(field.text().await?),
            Some("categories") | Some("categories[]") => {
                let value = field.text().await?;
                let id = value.trim().parse::<i64>().map_err(|_| {
                    AppError::validation(format!("Invalid category id: {value}"))
                })?;
                categories.push(id);
            }
            Some("image") => {
                let filename = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await?.to_vec();
                if let Some(filename) = filename
                    && !data.is_empty()
                {
                    image = Some(ImageUpload::Bytes { filename, data });
                }
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| AppError::validation("name is required"))?;
    let description = description.ok_or_else(|| AppError::validation("description is required"))?;
    let price = price.ok_or_else(|| AppError::validation("price is required"))?;
    let price: Decimal = price
        .trim()
        .parse()
        .map_err(|_| AppError::validation("Price must be a valid number (e.g., 99.99)"))?;

    let payload = ProductCreate {
        name,
        description,
        price,
        image: None,
        categories,
    };
    let product = state.catalog.create_product(payload, image).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 删除商品 (返回是否删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = state.catalog.delete_product(id).await?;
    Ok(Json(deleted))
}
