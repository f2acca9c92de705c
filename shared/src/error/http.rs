//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::SupplierNotFound
            | Self::InvoiceNotFound
            | Self::OperationNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::SupplierInactive
            | Self::InvoiceCancelled
            | Self::InvoiceAlreadyPaid => StatusCode::CONFLICT,

            // 402 Payment Required
            Self::InsufficientCredit => StatusCode::PAYMENT_REQUIRED,

            // 422 Unprocessable (stored data violates a ledger invariant)
            Self::InconsistentLedgerEntry | Self::InvoiceMalformed => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 503 Service Unavailable (transient errors, client can retry)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Whether a client may retry the request unchanged
    pub fn is_transient(&self) -> bool {
        self.http_status() == StatusCode::SERVICE_UNAVAILABLE
    }
}
