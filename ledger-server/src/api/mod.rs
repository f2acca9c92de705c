//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`suppliers`] - 供应商资料、余额重算、信用额度
//! - [`invoices`] - 供应商发票与付款
//! - [`operations`] - 收银台流水
//! - [`admin`] - 账目修复与批量对账

pub mod admin;
pub mod health;
pub mod invoices;
pub mod operations;
pub mod suppliers;

use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(suppliers::router())
        .merge(invoices::router())
        .merge(operations::router())
        .merge(admin::router())
}

/// Build a fully configured application with middleware and state
pub fn build_app(state: &ServerState) -> Router {
    build_router()
        .with_state(state.clone())
        // ========== Tower HTTP Middleware ==========
        .layer(TimeoutLayer::new(Duration::from_millis(
            state.config.request_timeout_ms,
        )))
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
}
