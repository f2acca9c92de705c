//! Ledger maintenance API 模块
//!
//! 修复例程和批量对账；确认由调用方负责 (例如 `ledger-admin` CLI)。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/ledger", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/preview", get(handler::preview))
        .route("/normalize-signs", post(handler::normalize_signs))
        .route("/normalize-directions", post(handler::normalize_directions))
        .route("/reconcile", post(handler::reconcile))
        .route("/repair", post(handler::repair))
}
