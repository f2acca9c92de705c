//! Supplier API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    Invoice, Operation, PaymentCapacity, Supplier, SupplierBalance, SupplierCreate,
    SupplierUpdate,
};

#[derive(Deserialize)]
pub struct CapacityQuery {
    pub amount: f64,
}

/// GET /api/suppliers - 获取所有供应商 (含缓存余额)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Supplier>>> {
    Ok(Json(state.ledger.list_suppliers().await?))
}

/// GET /api/suppliers/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Supplier>> {
    Ok(Json(state.ledger.get_supplier(id).await?))
}

/// POST /api/suppliers - 创建供应商 (可带期初欠款/预付款)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SupplierCreate>,
) -> AppResult<Json<Supplier>> {
    Ok(Json(state.ledger.create_supplier(payload).await?))
}

/// PUT /api/suppliers/:id - 更新资料 (不含余额)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SupplierUpdate>,
) -> AppResult<Json<Supplier>> {
    Ok(Json(state.ledger.update_supplier(id, payload).await?))
}

/// POST /api/suppliers/:id/recompute - 重算并缓存余额
pub async fn recompute(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SupplierBalance>> {
    Ok(Json(state.ledger.recompute(id).await?))
}

/// GET /api/suppliers/:id/capacity?amount= - 信用额度可支付金额
pub async fn capacity(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<CapacityQuery>,
) -> AppResult<Json<PaymentCapacity>> {
    Ok(Json(state.ledger.capacity(id, query.amount).await?))
}

/// GET /api/suppliers/:id/invoices
pub async fn invoices(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Invoice>>> {
    Ok(Json(state.ledger.supplier_invoices(id).await?))
}

/// GET /api/suppliers/:id/operations - 供应商账目 (预付款/付款)
pub async fn operations(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Operation>>> {
    Ok(Json(state.ledger.supplier_operations(id).await?))
}
