//! Ledger entry classification
//!
//! Raw [`Operation`] rows are turned into a tagged [`LedgerEntry`] before the
//! engine sees them. This is the only place the `INITIAL` reference sentinel
//! is interpreted.

use super::money::money;
use rust_decimal::Decimal;
use shared::models::{
    Direction, InconsistencyKind, LedgerInconsistency, Operation, OperationCategory, PaymentMethod,
};

/// Channel through which an invoice settlement was funded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementChannel {
    /// Drawn from the supplier's standing credit
    Credit,
    /// Paid out of the register (cash, transfer, cheque)
    Cash(PaymentMethod),
}

/// A supplier ledger entry, by meaning
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEntry {
    /// Starting debt declared at onboarding
    SeededBalance { supplier_id: i64, amount: Decimal },
    /// Payment toward the supplier's invoices
    InvoiceSettlement {
        supplier_id: i64,
        /// None for legacy entries written before invoices were linked
        invoice_id: Option<i64>,
        channel: SettlementChannel,
        amount: Decimal,
    },
    /// Money handed to the supplier ahead of any invoice
    StandaloneAdvance { supplier_id: i64, amount: Decimal },
}

impl LedgerEntry {
    pub fn supplier_id(&self) -> i64 {
        match self {
            LedgerEntry::SeededBalance { supplier_id, .. }
            | LedgerEntry::InvoiceSettlement { supplier_id, .. }
            | LedgerEntry::StandaloneAdvance { supplier_id, .. } => *supplier_id,
        }
    }

    /// Always a non-negative magnitude
    pub fn amount(&self) -> Decimal {
        match self {
            LedgerEntry::SeededBalance { amount, .. }
            | LedgerEntry::InvoiceSettlement { amount, .. }
            | LedgerEntry::StandaloneAdvance { amount, .. } => *amount,
        }
    }
}

/// Classification result plus any invariant violations found on the row
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub entry: LedgerEntry,
    pub inconsistencies: Vec<LedgerInconsistency>,
}

/// Classify one operation
///
/// Returns `None` for rows that do not affect supplier balances (other
/// categories, or no supplier). Negative amounts are taken by magnitude and
/// inflow directions are tolerated; both are reported so the normalizer can
/// fix the row later.
pub fn classify(op: &Operation) -> Option<Classified> {
    let supplier_id = op.supplier_id?;
    if !op.category.is_supplier() {
        return None;
    }

    let mut inconsistencies = Vec::new();
    if op.amount < 0.0 {
        inconsistencies.push(LedgerInconsistency {
            operation_id: op.id,
            kind: InconsistencyKind::NegativeAmount,
        });
    }
    if op.direction != Direction::Outflow {
        inconsistencies.push(LedgerInconsistency {
            operation_id: op.id,
            kind: InconsistencyKind::WrongDirection,
        });
    }

    let amount = money(op.amount).abs();
    let entry = match op.category {
        OperationCategory::SupplierAdvance => LedgerEntry::StandaloneAdvance {
            supplier_id,
            amount,
        },
        OperationCategory::SupplierPayment if op.is_initial() => LedgerEntry::SeededBalance {
            supplier_id,
            amount,
        },
        OperationCategory::SupplierPayment => {
            // Cash-channel settlements are written by the payment processor
            // with both the invoice link and the method set.
            let channel = match (op.invoice_id, op.payment_method) {
                (Some(_), Some(method)) => SettlementChannel::Cash(method),
                _ => SettlementChannel::Credit,
            };
            LedgerEntry::InvoiceSettlement {
                supplier_id,
                invoice_id: op.invoice_id,
                channel,
                amount,
            }
        }
        _ => return None,
    };

    Some(Classified {
        entry,
        inconsistencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::INITIAL_REFERENCE;

    fn op(category: OperationCategory, amount: f64) -> Operation {
        Operation {
            id: 1,
            supplier_id: Some(10),
            agency_id: 1,
            user_id: None,
            date: 0,
            direction: Direction::Outflow,
            amount,
            category,
            reference: None,
            payment_method: None,
            invoice_id: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_initial_payment_is_seeded_balance() {
        let mut row = op(OperationCategory::SupplierPayment, 1500.0);
        row.reference = Some(INITIAL_REFERENCE.to_string());

        let classified = classify(&row).unwrap();
        assert_eq!(
            classified.entry,
            LedgerEntry::SeededBalance {
                supplier_id: 10,
                amount: Decimal::new(1500, 0)
            }
        );
        assert!(classified.inconsistencies.is_empty());
    }

    #[test]
    fn test_initial_advance_stays_an_advance() {
        let mut row = op(OperationCategory::SupplierAdvance, 80.0);
        row.reference = Some(INITIAL_REFERENCE.to_string());
        let classified = classify(&row).unwrap();
        assert!(matches!(classified.entry, LedgerEntry::StandaloneAdvance { .. }));
    }

    #[test]
    fn test_settlement_channels() {
        // Legacy payment without invoice link draws on credit even with a method
        let mut legacy = op(OperationCategory::SupplierPayment, 100.0);
        legacy.payment_method = Some(PaymentMethod::Cash);
        let entry = classify(&legacy).unwrap().entry;
        assert!(matches!(
            entry,
            LedgerEntry::InvoiceSettlement {
                channel: SettlementChannel::Credit,
                invoice_id: None,
                ..
            }
        ));

        let mut cash = op(OperationCategory::SupplierPayment, 100.0);
        cash.invoice_id = Some(5);
        cash.payment_method = Some(PaymentMethod::Cheque);
        let entry = classify(&cash).unwrap().entry;
        assert!(matches!(
            entry,
            LedgerEntry::InvoiceSettlement {
                channel: SettlementChannel::Cash(PaymentMethod::Cheque),
                invoice_id: Some(5),
                ..
            }
        ));

        let mut credit = op(OperationCategory::SupplierPayment, 100.0);
        credit.invoice_id = Some(5);
        let entry = classify(&credit).unwrap().entry;
        assert!(matches!(
            entry,
            LedgerEntry::InvoiceSettlement {
                channel: SettlementChannel::Credit,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_row_counts_by_magnitude() {
        let mut row = op(OperationCategory::SupplierAdvance, -200.0);
        row.direction = Direction::Inflow;

        let classified = classify(&row).unwrap();
        assert_eq!(classified.entry.amount(), Decimal::new(200, 0));
        let kinds: Vec<_> = classified.inconsistencies.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![InconsistencyKind::NegativeAmount, InconsistencyKind::WrongDirection]
        );
    }

    #[test]
    fn test_unrelated_rows_are_skipped() {
        assert!(classify(&op(OperationCategory::Sale, 50.0)).is_none());
        let mut orphan = op(OperationCategory::SupplierPayment, 50.0);
        orphan.supplier_id = None;
        assert!(classify(&orphan).is_none());
    }
}
