//! Balance Reconciliation Engine
//!
//! `debt`/`credit` on a supplier are a materialized view over the invoice
//! and ledger tables. [`compute_balances`] is the pure derivation;
//! [`LedgerService::recompute`] runs it under the supplier lock and writes
//! the cache.
//!
//! ```text
//! invoice_debt   = Σ (total_due - amount_paid)      non-cancelled invoices
//! seeded_debt    = Σ SeededBalance
//! debt           = invoice_debt + seeded_debt
//! total_advances = Σ StandaloneAdvance
//! credit_drawn   = Σ InvoiceSettlement(Credit)
//! credit         = max(total_advances - credit_drawn, 0)
//! ```

use super::entry::{LedgerEntry, SettlementChannel, classify};
use super::money::{MONEY_TOLERANCE, money, money_eq, to_f64};
use super::LedgerService;
use crate::db::repository::{invoice, operation, supplier};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{BalanceBreakdown, Invoice, Operation, SupplierBalance};
use sqlx::SqliteConnection;

/// Derived balances for one supplier
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedBalance {
    pub debt: Decimal,
    pub credit: Decimal,
    pub breakdown: BalanceBreakdown,
}

/// Derive `{debt, credit}` from a supplier's invoices and ledger rows
///
/// Total for well-formed input: an empty history yields zeros. Cancelled
/// invoices and rows belonging to other suppliers are ignored. Fails only on
/// an invoice whose amounts are impossible (negative, or paid above due).
pub fn compute_balances(
    supplier_id: i64,
    invoices: &[Invoice],
    operations: &[Operation],
) -> AppResult<ComputedBalance> {
    let mut invoice_debt = Decimal::ZERO;
    for inv in invoices
        .iter()
        .filter(|i| i.supplier_id == supplier_id && !i.status.is_cancelled())
    {
        invoice_debt += outstanding(inv)?;
    }

    let mut seeded_debt = Decimal::ZERO;
    let mut total_advances = Decimal::ZERO;
    let mut credit_drawn = Decimal::ZERO;
    let mut cash_settlements = Decimal::ZERO;
    let mut inconsistencies = Vec::new();

    for classified in operations.iter().filter_map(classify) {
        if classified.entry.supplier_id() != supplier_id {
            continue;
        }
        inconsistencies.extend(classified.inconsistencies);
        match classified.entry {
            LedgerEntry::SeededBalance { amount, .. } => seeded_debt += amount,
            LedgerEntry::StandaloneAdvance { amount, .. } => total_advances += amount,
            LedgerEntry::InvoiceSettlement {
                channel: SettlementChannel::Credit,
                amount,
                ..
            } => credit_drawn += amount,
            LedgerEntry::InvoiceSettlement {
                channel: SettlementChannel::Cash(_),
                amount,
                ..
            } => cash_settlements += amount,
        }
    }

    let debt = invoice_debt + seeded_debt;
    let credit = (total_advances - credit_drawn).max(Decimal::ZERO);

    Ok(ComputedBalance {
        debt,
        credit,
        breakdown: BalanceBreakdown {
            invoice_debt: to_f64(invoice_debt),
            seeded_debt: to_f64(seeded_debt),
            total_advances: to_f64(total_advances),
            total_credit_payments: to_f64(credit_drawn),
            cash_settlements: to_f64(cash_settlements),
            inconsistencies,
        },
    })
}

/// Outstanding amount of one invoice, validating its shape
pub fn outstanding(inv: &Invoice) -> AppResult<Decimal> {
    let due = money(inv.total_due);
    let paid = money(inv.amount_paid);
    if due < Decimal::ZERO || paid < Decimal::ZERO || paid - due >= MONEY_TOLERANCE {
        return Err(AppError::with_message(
            ErrorCode::InvoiceMalformed,
            format!(
                "Invoice {} has inconsistent amounts (total_due={}, amount_paid={})",
                inv.id, inv.total_due, inv.amount_paid
            ),
        )
        .with_detail("invoice_id", inv.id)
        .with_detail("total_due", inv.total_due)
        .with_detail("amount_paid", inv.amount_paid));
    }
    Ok((due - paid).max(Decimal::ZERO))
}

/// Recompute inside an open transaction
///
/// The first statement is a write (dirty flag), which both takes the SQLite
/// write lock and checks that the supplier exists. Both cached fields are
/// written in one statement, and only when they moved.
pub(crate) async fn recompute_in_tx(
    conn: &mut SqliteConnection,
    supplier_id: i64,
) -> AppResult<SupplierBalance> {
    if !supplier::mark_dirty(&mut *conn, supplier_id).await? {
        return Err(AppError::supplier_not_found(supplier_id));
    }
    let current = supplier::find_by_id(&mut *conn, supplier_id)
        .await?
        .ok_or_else(|| AppError::supplier_not_found(supplier_id))?;

    let invoices = invoice::find_billable_by_supplier(&mut *conn, supplier_id).await?;
    let entries = operation::find_supplier_entries(&mut *conn, supplier_id).await?;
    let computed = compute_balances(supplier_id, &invoices, &entries).map_err(|e| {
        e.with_detail("supplier_id", supplier_id)
    })?;

    if !computed.breakdown.inconsistencies.is_empty() {
        tracing::warn!(
            supplier_id,
            count = computed.breakdown.inconsistencies.len(),
            "Ledger entries violate the category-direction invariant; counted by magnitude"
        );
    }

    let debt = to_f64(computed.debt);
    let credit = to_f64(computed.credit);
    let changed = !money_eq(current.debt, debt) || !money_eq(current.credit, credit);
    let now = shared::util::now_millis();

    if changed {
        supplier::store_balance(&mut *conn, supplier_id, debt, credit, now).await?;
        tracing::debug!(
            supplier_id,
            old_debt = current.debt,
            old_credit = current.credit,
            debt,
            credit,
            "Supplier balance updated"
        );
    } else {
        supplier::clear_dirty(&mut *conn, supplier_id, now).await?;
    }

    Ok(SupplierBalance {
        supplier_id,
        debt,
        credit,
        previous_debt: current.debt,
        previous_credit: current.credit,
        changed,
        breakdown: computed.breakdown,
    })
}

impl LedgerService {
    /// Recompute and cache one supplier's balances
    pub async fn recompute(&self, supplier_id: i64) -> AppResult<SupplierBalance> {
        let _guard = self.locks.lock(supplier_id).await;
        let mut tx = self.begin().await?;
        let balance = recompute_in_tx(&mut *tx, supplier_id).await?;
        Self::commit(tx).await?;
        Ok(balance)
    }

    /// Derive balances from current state without writing anything
    pub async fn derive(&self, supplier_id: i64) -> AppResult<ComputedBalance> {
        let mut conn = self.acquire().await?;
        supplier::find_by_id(&mut conn, supplier_id)
            .await?
            .ok_or_else(|| AppError::supplier_not_found(supplier_id))?;
        let invoices = invoice::find_billable_by_supplier(&mut conn, supplier_id).await?;
        let entries = operation::find_supplier_entries(&mut conn, supplier_id).await?;
        compute_balances(supplier_id, &invoices, &entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Direction, InvoiceStatus, OperationCategory, PaymentMethod, INITIAL_REFERENCE};

    const SUPPLIER: i64 = 10;

    fn entry(id: i64, category: OperationCategory, amount: f64) -> Operation {
        Operation {
            id,
            supplier_id: Some(SUPPLIER),
            agency_id: 1,
            user_id: None,
            date: id,
            direction: Direction::Outflow,
            amount,
            category,
            reference: None,
            payment_method: None,
            invoice_id: None,
            created_at: 0,
        }
    }

    fn invoice(id: i64, total_due: f64, amount_paid: f64, status: InvoiceStatus) -> Invoice {
        Invoice {
            id,
            supplier_id: SUPPLIER,
            number: format!("INV-{id}"),
            total_due,
            amount_paid,
            status,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn test_empty_history_is_zero() {
        let computed = compute_balances(SUPPLIER, &[], &[]).unwrap();
        assert_eq!(computed.debt, Decimal::ZERO);
        assert_eq!(computed.credit, Decimal::ZERO);
        assert_eq!(computed.breakdown, BalanceBreakdown::default());
    }

    #[test]
    fn test_seeded_debt_only() {
        let mut seed = entry(1, OperationCategory::SupplierPayment, 1500.0);
        seed.reference = Some(INITIAL_REFERENCE.into());

        let computed = compute_balances(SUPPLIER, &[], &[seed]).unwrap();
        assert_eq!(computed.debt, dec(1500));
        assert_eq!(computed.credit, Decimal::ZERO);
        assert_eq!(computed.breakdown.seeded_debt, 1500.0);
        assert_eq!(computed.breakdown.total_credit_payments, 0.0);
    }

    #[test]
    fn test_advance_only() {
        let advance = entry(1, OperationCategory::SupplierAdvance, 500.0);
        let computed = compute_balances(SUPPLIER, &[], &[advance]).unwrap();
        assert_eq!(computed.credit, dec(500));
        assert_eq!(computed.debt, Decimal::ZERO);
    }

    #[test]
    fn test_invoice_debt_skips_cancelled() {
        let invoices = vec![
            invoice(1, 1000.0, 400.0, InvoiceStatus::PartiallyPaid),
            invoice(2, 250.0, 0.0, InvoiceStatus::Sent),
            invoice(3, 9999.0, 0.0, InvoiceStatus::Cancelled),
            invoice(4, 300.0, 300.0, InvoiceStatus::Paid),
        ];
        let computed = compute_balances(SUPPLIER, &invoices, &[]).unwrap();
        assert_eq!(computed.debt, dec(850));
        assert_eq!(computed.breakdown.invoice_debt, 850.0);
    }

    #[test]
    fn test_credit_floors_at_zero() {
        let ops = vec![
            entry(1, OperationCategory::SupplierAdvance, 100.0),
            entry(2, OperationCategory::SupplierPayment, 250.0),
        ];
        let computed = compute_balances(SUPPLIER, &[], &ops).unwrap();
        assert_eq!(computed.credit, Decimal::ZERO);
        assert_eq!(computed.breakdown.total_advances, 100.0);
        assert_eq!(computed.breakdown.total_credit_payments, 250.0);
    }

    #[test]
    fn test_cash_settlement_does_not_draw_credit() {
        let mut cash = entry(2, OperationCategory::SupplierPayment, 300.0);
        cash.invoice_id = Some(1);
        cash.payment_method = Some(PaymentMethod::Transfer);
        let mut from_credit = entry(3, OperationCategory::SupplierPayment, 120.0);
        from_credit.invoice_id = Some(1);

        let ops = vec![
            entry(1, OperationCategory::SupplierAdvance, 300.0),
            cash,
            from_credit,
        ];
        let computed = compute_balances(SUPPLIER, &[], &ops).unwrap();
        assert_eq!(computed.credit, dec(180));
        assert_eq!(computed.breakdown.cash_settlements, 300.0);
        assert_eq!(computed.breakdown.total_credit_payments, 120.0);
    }

    #[test]
    fn test_inconsistent_rows_counted_by_magnitude() {
        let mut negative = entry(1, OperationCategory::SupplierAdvance, -200.0);
        negative.direction = Direction::Inflow;
        let computed = compute_balances(SUPPLIER, &[], &[negative]).unwrap();
        assert_eq!(computed.credit, dec(200));
        assert_eq!(computed.breakdown.inconsistencies.len(), 2);
    }

    #[test]
    fn test_other_suppliers_and_categories_ignored() {
        let mut foreign = entry(1, OperationCategory::SupplierAdvance, 700.0);
        foreign.supplier_id = Some(99);
        let sale = entry(2, OperationCategory::Sale, 50.0);
        let mut foreign_invoice = invoice(1, 100.0, 0.0, InvoiceStatus::Sent);
        foreign_invoice.supplier_id = 99;

        let computed = compute_balances(SUPPLIER, &[foreign_invoice], &[foreign, sale]).unwrap();
        assert_eq!(computed.debt, Decimal::ZERO);
        assert_eq!(computed.credit, Decimal::ZERO);
    }

    #[test]
    fn test_malformed_invoice_fails() {
        let overpaid = invoice(7, 100.0, 150.0, InvoiceStatus::Paid);
        let err = compute_balances(SUPPLIER, &[overpaid], &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvoiceMalformed);
        assert_eq!(err.details.unwrap().get("invoice_id").unwrap(), 7);

        let negative = invoice(8, -10.0, 0.0, InvoiceStatus::Sent);
        assert!(compute_balances(SUPPLIER, &[negative], &[]).is_err());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let ops = vec![
            entry(1, OperationCategory::SupplierAdvance, 333.33),
            entry(2, OperationCategory::SupplierPayment, 111.11),
        ];
        let invoices = vec![invoice(1, 999.99, 0.01, InvoiceStatus::Sent)];
        let a = compute_balances(SUPPLIER, &invoices, &ops).unwrap();
        let b = compute_balances(SUPPLIER, &invoices, &ops).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.credit, Decimal::new(22222, 2));
        assert_eq!(a.debt, Decimal::new(99998, 2));
    }
}
