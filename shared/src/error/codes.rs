//! Unified error codes for the supplier ledger
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Supplier errors
//! - 2xxx: Invoice errors
//! - 3xxx: Ledger errors
//! - 4xxx: Payment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the back-office frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Supplier ====================
    /// Supplier not found
    SupplierNotFound = 1001,
    /// Supplier is deactivated
    SupplierInactive = 1002,

    // ==================== 2xxx: Invoice ====================
    /// Invoice not found
    InvoiceNotFound = 2001,
    /// Invoice has been cancelled
    InvoiceCancelled = 2002,
    /// Invoice amounts violate paid <= due
    InvoiceMalformed = 2003,
    /// Invoice is already fully paid
    InvoiceAlreadyPaid = 2004,

    // ==================== 3xxx: Ledger ====================
    /// Ledger entry category/direction mismatch
    InconsistentLedgerEntry = 3001,
    /// Ledger operation not found
    OperationNotFound = 3002,

    // ==================== 4xxx: Payment ====================
    /// Amount is non-positive or exceeds the outstanding balance
    InvalidAmount = 4001,
    /// Credit balance does not cover the requested amount
    InsufficientCredit = 4002,
    /// Cash channel used without a payment method
    MissingPaymentMethod = 4003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Supplier
            ErrorCode::SupplierNotFound => "Supplier not found",
            ErrorCode::SupplierInactive => "Supplier is inactive",

            // Invoice
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InvoiceCancelled => "Invoice has been cancelled",
            ErrorCode::InvoiceMalformed => "Invoice amounts are inconsistent",
            ErrorCode::InvoiceAlreadyPaid => "Invoice has already been paid",

            // Ledger
            ErrorCode::InconsistentLedgerEntry => {
                "Ledger entry direction does not match its category"
            }
            ErrorCode::OperationNotFound => "Ledger operation not found",

            // Payment
            ErrorCode::InvalidAmount => "Invalid amount",
            ErrorCode::InsufficientCredit => "Insufficient supplier credit",
            ErrorCode::MissingPaymentMethod => "Payment method is required",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Supplier
            1001 => Ok(ErrorCode::SupplierNotFound),
            1002 => Ok(ErrorCode::SupplierInactive),

            // Invoice
            2001 => Ok(ErrorCode::InvoiceNotFound),
            2002 => Ok(ErrorCode::InvoiceCancelled),
            2003 => Ok(ErrorCode::InvoiceMalformed),
            2004 => Ok(ErrorCode::InvoiceAlreadyPaid),

            // Ledger
            3001 => Ok(ErrorCode::InconsistentLedgerEntry),
            3002 => Ok(ErrorCode::OperationNotFound),

            // Payment
            4001 => Ok(ErrorCode::InvalidAmount),
            4002 => Ok(ErrorCode::InsufficientCredit),
            4003 => Ok(ErrorCode::MissingPaymentMethod),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::SupplierNotFound.code(), 1001);
        assert_eq!(ErrorCode::InvoiceNotFound.code(), 2001);
        assert_eq!(ErrorCode::InvoiceMalformed.code(), 2003);
        assert_eq!(ErrorCode::InconsistentLedgerEntry.code(), 3001);
        assert_eq!(ErrorCode::InvalidAmount.code(), 4001);
        assert_eq!(ErrorCode::InsufficientCredit.code(), 4002);
        assert_eq!(ErrorCode::MissingPaymentMethod.code(), 4003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_round_trips_every_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::SupplierNotFound,
            ErrorCode::SupplierInactive,
            ErrorCode::InvoiceNotFound,
            ErrorCode::InvoiceCancelled,
            ErrorCode::InvoiceMalformed,
            ErrorCode::InvoiceAlreadyPaid,
            ErrorCode::InconsistentLedgerEntry,
            ErrorCode::OperationNotFound,
            ErrorCode::InvalidAmount,
            ErrorCode::InsufficientCredit,
            ErrorCode::MissingPaymentMethod,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
            ErrorCode::TimeoutError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(6), Err(InvalidErrorCode(6)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::InsufficientCredit).unwrap();
        assert_eq!(json, "4002");

        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::MissingPaymentMethod);

        assert!(serde_json::from_str::<ErrorCode>("1234").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::InvoiceCancelled), "2002");
    }
}
