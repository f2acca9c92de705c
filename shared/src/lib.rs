//! Shared types for the supplier ledger back office
//!
//! Common types used by the ledger server, the admin tooling and the
//! surrounding CRUD application: data models, the unified error system and
//! small utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
