//! Invoice payment request/response types

use super::{InvoiceStatus, PaymentMethod};
use serde::{Deserialize, Serialize};

/// How an invoice payment is funded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Draw entirely from the supplier's credit
    CreditOnly,
    /// Pay entirely through a cash channel
    CashOnly,
    /// Draw credit first, cover the remainder through a cash channel
    Mixed,
}

impl PaymentMode {
    pub fn uses_credit(&self) -> bool {
        matches!(self, PaymentMode::CreditOnly | PaymentMode::Mixed)
    }

    pub fn needs_method(&self) -> bool {
        !matches!(self, PaymentMode::CreditOnly)
    }
}

/// Pay-invoice request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub requested_amount: f64,
    pub mode: PaymentMode,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Supplier balances after a write
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BalanceSnapshot {
    pub debt: f64,
    pub credit: f64,
}

/// Pay-invoice result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentResult {
    pub success: bool,
    pub invoice_id: i64,
    pub supplier_id: i64,
    pub applied_from_credit: f64,
    pub applied_from_cash: f64,
    pub amount_paid: f64,
    pub updated_invoice_status: InvoiceStatus,
    /// Ledger entries appended by this payment
    pub operation_ids: Vec<i64>,
    pub balance: BalanceSnapshot,
}

/// Credit capacity check for a prospective payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentCapacity {
    pub supplier_id: i64,
    pub requested_amount: f64,
    pub available_credit: f64,
    pub payable_from_credit: f64,
    pub fully_payable: bool,
}
