//! 统一错误处理
//!
//! 错误类型定义在 `shared::error`，这里只做 re-export 并提供响应辅助函数。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::with_message(ErrorCode::OrderNotFound, "Order 12 not found"))
//!
//! // 返回成功响应
//! Ok(ok(order))
//! ```

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 成功响应 `{code: 0, message: "OK", data}`
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
