//! Unified error system for the supplier ledger
//!
//! This module provides the error handling used by every layer:
//! - [`ErrorCode`]: Standardized numeric error codes
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with code, message and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Supplier errors
//! - 2xxx: Invoice errors
//! - 3xxx: Ledger errors
//! - 4xxx: Payment errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::InsufficientCredit);
//!
//! // Create an error with custom message
//! let err = AppError::with_message(ErrorCode::InvalidAmount, "Amount must be positive");
//!
//! // Create an error with details
//! let err = AppError::invalid_amount("Amount exceeds outstanding balance")
//!     .with_detail("outstanding", 400.0);
//!
//! // Convert to API response
//! let response = ApiResponse::<()>::error(&err);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
