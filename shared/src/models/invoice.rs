//! Supplier Invoice Model

use serde::{Deserialize, Serialize};

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum InvoiceStatus {
    Draft,
    Sent,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvoiceStatus::Cancelled)
    }
}

/// Supplier invoice (供应商发票)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub supplier_id: i64,
    pub number: String,
    pub total_due: f64,
    pub amount_paid: f64,
    pub status: InvoiceStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create invoice payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreate {
    pub supplier_id: i64,
    pub number: String,
    pub total_due: f64,
    /// Amount already settled outside the ledger (defaults to 0)
    #[serde(default)]
    pub amount_paid: Option<f64>,
    /// Defaults to `draft`
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
}

/// Update invoice payload
///
/// No `amount_paid`: only the payment processor moves it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceUpdate {
    pub number: Option<String>,
    pub total_due: Option<f64>,
    pub status: Option<InvoiceStatus>,
}
