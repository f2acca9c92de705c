//! 统一错误处理
//!
//! Re-exports the unified error system from `shared::error` and bridges the
//! repository layer into it:
//!
//! | RepoError | ErrorCode |
//! |-----------|-----------|
//! | NotFound | NotFound (404) |
//! | Duplicate | AlreadyExists (409) |
//! | Validation | ValidationFailed (400) |
//! | Database | DatabaseError (500, logged) |
//!
//! # 使用示例
//!
//! ```ignore
//! let supplier = supplier::find_by_id(&mut conn, id)
//!     .await?
//!     .ok_or_else(|| AppError::supplier_not_found(id))?;
//! Ok(Json(ApiResponse::success(supplier)))
//! ```

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

use crate::db::repository::RepoError;
use axum::Json;
use serde::Serialize;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(target: "database", error = %msg, "Database error occurred");
                AppError::database(msg)
            }
        }
    }
}

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}
