//! 商品图片访问
//!
//! 提供已存储图片的稳定访问地址 (`/api/image/products/<file>`)，
//! 与存储目录的内部布局解耦。

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/image/{*path}", get(serve))
}

/// GET /api/image/{path} - 返回存储的商品图片
pub async fn serve(
    State(state): State<ServerState>,
    Path(path): Path<String>,
) -> AppResult<Response> {
    let file_path = state
        .images
        .resolve(&path)
        .ok_or_else(|| AppError::validation("Invalid image path"))?;
    let data = tokio::fs::read(&file_path)
        .await
        .map_err(|_| AppError::not_found("Image not found"))?;
    let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.to_string())], data).into_response())
}
