//! Operation API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{Operation, OperationCreate};

/// POST /api/operations - 记录收银台流水
///
/// 供应商类流水必须为 outflow，且会在同一事务内重算供应商余额。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OperationCreate>,
) -> AppResult<Json<Operation>> {
    Ok(Json(state.ledger.record_operation(payload).await?))
}

/// GET /api/operations/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Operation>> {
    Ok(Json(state.ledger.get_operation(id).await?))
}
