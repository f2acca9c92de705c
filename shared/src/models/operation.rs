//! Ledger Operation Model (cash-register events)

use serde::{Deserialize, Serialize};

/// Reference sentinel marking a synthetic entry that seeds a supplier's
/// starting balance at onboarding.
pub const INITIAL_REFERENCE: &str = "INITIAL";

/// Cash movement direction; the amount itself is always a magnitude
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum Direction {
    Inflow,
    Outflow,
}

/// Operation category
///
/// Only `SupplierAdvance` and `SupplierPayment` feed the balance engine; the
/// rest are ordinary cash-register movements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OperationCategory {
    SupplierAdvance,
    SupplierPayment,
    Sale,
    Refund,
    Expense,
    Deposit,
    Withdrawal,
    Misc,
}

impl OperationCategory {
    /// Categories bound by the category-direction invariant (always outflow)
    pub const SUPPLIER: [OperationCategory; 2] = [
        OperationCategory::SupplierAdvance,
        OperationCategory::SupplierPayment,
    ];

    pub fn is_supplier(&self) -> bool {
        matches!(
            self,
            OperationCategory::SupplierAdvance | OperationCategory::SupplierPayment
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupplierAdvance => "supplier_advance",
            Self::SupplierPayment => "supplier_payment",
            Self::Sale => "sale",
            Self::Refund => "refund",
            Self::Expense => "expense",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Misc => "misc",
        }
    }
}

impl std::fmt::Display for OperationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cash channel used to settle an outflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Cheque,
}

/// Ledger entry (一条收银流水)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Operation {
    pub id: i64,
    /// None for movements unrelated to suppliers
    pub supplier_id: Option<i64>,
    pub agency_id: i64,
    pub user_id: Option<i64>,
    /// Business date (Unix millis)
    pub date: i64,
    pub direction: Direction,
    pub amount: f64,
    pub category: OperationCategory,
    pub reference: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    /// Invoice settled by this entry (supplier_payment written by the payment processor)
    pub invoice_id: Option<i64>,
    pub created_at: i64,
}

impl Operation {
    /// Synthetic onboarding entry
    pub fn is_initial(&self) -> bool {
        self.reference.as_deref() == Some(INITIAL_REFERENCE)
    }
}

/// Create operation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationCreate {
    pub supplier_id: Option<i64>,
    pub agency_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Defaults to now
    #[serde(default)]
    pub date: Option<i64>,
    pub direction: Direction,
    pub amount: f64,
    pub category: OperationCategory,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub invoice_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_matches_db_spelling() {
        let json = serde_json::to_string(&OperationCategory::SupplierAdvance).unwrap();
        assert_eq!(json, "\"supplier_advance\"");
        assert_eq!(
            format!("\"{}\"", OperationCategory::SupplierPayment),
            serde_json::to_string(&OperationCategory::SupplierPayment).unwrap()
        );
    }

    #[test]
    fn test_supplier_categories() {
        assert!(OperationCategory::SupplierAdvance.is_supplier());
        assert!(OperationCategory::SupplierPayment.is_supplier());
        assert!(!OperationCategory::Sale.is_supplier());
        assert!(!OperationCategory::Misc.is_supplier());
    }

    #[test]
    fn test_create_payload_defaults() {
        let json = r#"{
            "supplier_id": 1,
            "agency_id": 2,
            "direction": "outflow",
            "amount": 150.5,
            "category": "supplier_advance"
        }"#;
        let payload: OperationCreate = serde_json::from_str(json).unwrap();
        assert_eq!(payload.direction, Direction::Outflow);
        assert!(payload.reference.is_none());
        assert!(payload.payment_method.is_none());
        assert!(payload.date.is_none());
    }
}
