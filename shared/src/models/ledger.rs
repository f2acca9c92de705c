//! Balance engine and maintenance report types

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};

/// Kind of ledger anomaly tolerated during recomputation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyKind {
    /// Stored amount is negative (counted by magnitude)
    NegativeAmount,
    /// Supplier category recorded as inflow
    WrongDirection,
}

/// A ledger entry that violates a write-time invariant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerInconsistency {
    pub operation_id: i64,
    pub kind: InconsistencyKind,
}

/// Breakdown of the totals that produced a supplier's balances
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BalanceBreakdown {
    /// Σ max(0, total_due - amount_paid) over non-cancelled invoices
    pub invoice_debt: f64,
    /// Σ INITIAL supplier_payment amounts
    pub seeded_debt: f64,
    /// Σ supplier_advance amounts
    pub total_advances: f64,
    /// Σ supplier_payment amounts that drew on credit
    pub total_credit_payments: f64,
    /// Σ invoice-linked supplier_payment amounts settled through a cash channel
    pub cash_settlements: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inconsistencies: Vec<LedgerInconsistency>,
}

/// Result of recomputing one supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierBalance {
    pub supplier_id: i64,
    pub debt: f64,
    pub credit: f64,
    pub previous_debt: f64,
    pub previous_credit: f64,
    /// Whether the stored balances were rewritten
    pub changed: bool,
    pub breakdown: BalanceBreakdown,
}

impl SupplierBalance {
    pub fn change(&self) -> Option<BalanceChange> {
        self.changed.then(|| BalanceChange {
            supplier_id: self.supplier_id,
            old_debt: self.previous_debt,
            old_credit: self.previous_credit,
            new_debt: self.debt,
            new_credit: self.credit,
        })
    }
}

/// One supplier whose stored balances moved during reconciliation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceChange {
    pub supplier_id: i64,
    pub old_debt: f64,
    pub old_credit: f64,
    pub new_debt: f64,
    pub new_credit: f64,
}

/// Supplier that failed during a batch reconciliation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierFailure {
    pub supplier_id: i64,
    pub code: ErrorCode,
    pub message: String,
}

/// Batch reconciliation report
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconcileReport {
    /// Suppliers recomputed successfully
    pub processed: usize,
    pub failed: usize,
    pub changes: Vec<BalanceChange>,
    pub failures: Vec<SupplierFailure>,
}

/// Outcome of a normalization routine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizeReport {
    /// Ledger rows rewritten
    pub touched: u64,
    /// Suppliers flagged for recomputation
    pub affected_suppliers: Vec<i64>,
}

/// Canonical repair sequence: signs, directions, then reconciliation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RepairReport {
    pub signs: NormalizeReport,
    pub directions: NormalizeReport,
    pub reconcile: ReconcileReport,
}

/// Read-only count of what a repair would touch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LedgerPreview {
    pub negative_amounts: i64,
    pub misdirected_entries: i64,
    pub dirty_suppliers: i64,
    pub total_suppliers: i64,
}

impl LedgerPreview {
    pub fn is_clean(&self) -> bool {
        self.negative_amounts == 0 && self.misdirected_entries == 0 && self.dirty_suppliers == 0
    }
}
