//! Supplier API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/suppliers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/recompute", post(handler::recompute))
        .route("/{id}/capacity", get(handler::capacity))
        .route("/{id}/invoices", get(handler::invoices))
        .route("/{id}/operations", get(handler::operations))
}
