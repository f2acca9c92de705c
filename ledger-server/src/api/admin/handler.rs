//! Ledger maintenance handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};
use shared::models::{LedgerPreview, NormalizeReport, ReconcileReport, RepairReport};

#[derive(Debug, Default, Deserialize)]
pub struct ReconcileQuery {
    /// 只重算标记为脏的供应商
    #[serde(default)]
    pub dirty_only: bool,
}

/// GET /api/admin/ledger/preview - 统计修复将影响的记录 (只读)
pub async fn preview(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<LedgerPreview>>> {
    Ok(ok(state.ledger.preview().await?))
}

/// POST /api/admin/ledger/normalize-signs
pub async fn normalize_signs(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<NormalizeReport>>> {
    let report = state.ledger.normalize_signs().await?;
    let message = format!("{} negative amounts corrected", report.touched);
    Ok(ok_with_message(report, message))
}

/// POST /api/admin/ledger/normalize-directions
pub async fn normalize_directions(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<NormalizeReport>>> {
    let report = state.ledger.normalize_directions().await?;
    let message = format!("{} supplier entries set to outflow", report.touched);
    Ok(ok_with_message(report, message))
}

/// POST /api/admin/ledger/reconcile?dirty_only=
pub async fn reconcile(
    State(state): State<ServerState>,
    Query(query): Query<ReconcileQuery>,
) -> AppResult<Json<ApiResponse<ReconcileReport>>> {
    let report = if query.dirty_only {
        state.ledger.reconcile_dirty().await?
    } else {
        state.ledger.reconcile_all_suppliers().await?
    };
    let message = format!(
        "{} suppliers reconciled, {} changed, {} failed",
        report.processed,
        report.changes.len(),
        report.failed
    );
    Ok(ok_with_message(report, message))
}

/// POST /api/admin/ledger/repair - signs → directions → reconcile
pub async fn repair(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<RepairReport>>> {
    Ok(ok(state.ledger.repair().await?))
}
