//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Supplier errors
/// - 2xxx: Invoice errors
/// - 3xxx: Ledger errors
/// - 4xxx: Payment errors
/// - 9xxx: System errors
///
/// The 5xxx-8xxx ranges are unassigned and fall back to General.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Supplier errors (1xxx)
    Supplier,
    /// Invoice errors (2xxx)
    Invoice,
    /// Ledger errors (3xxx)
    Ledger,
    /// Payment errors (4xxx)
    Payment,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            1000..2000 => Self::Supplier,
            2000..3000 => Self::Invoice,
            3000..4000 => Self::Ledger,
            4000..5000 => Self::Payment,
            9000.. => Self::System,
            _ => Self::General,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Supplier => "supplier",
            Self::Invoice => "invoice",
            Self::Ledger => "ledger",
            Self::Payment => "payment",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
