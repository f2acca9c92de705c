//! Invoice API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    Invoice, InvoiceCreate, InvoiceUpdate, Operation, PaymentRequest, PaymentResult,
};

/// GET /api/invoices/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Invoice>> {
    Ok(Json(state.ledger.get_invoice(id).await?))
}

/// POST /api/invoices
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<InvoiceCreate>,
) -> AppResult<Json<Invoice>> {
    Ok(Json(state.ledger.create_invoice(payload).await?))
}

/// PUT /api/invoices/:id - 编号、金额、状态 (已付金额只能通过付款变更)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<InvoiceUpdate>,
) -> AppResult<Json<Invoice>> {
    Ok(Json(state.ledger.update_invoice(id, payload).await?))
}

/// POST /api/invoices/:id/pay - 混合付款 (信用额度 / 现金)
pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<PaymentResult>> {
    Ok(Json(state.ledger.pay(id, payload).await?))
}

/// GET /api/invoices/:id/operations - 该发票的结算流水
pub async fn operations(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Operation>>> {
    Ok(Json(state.ledger.invoice_operations(id).await?))
}
