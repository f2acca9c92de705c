//! Mixed-Mode Payment Processor
//!
//! Pays an invoice from the supplier's credit, a cash channel, or both
//! (credit first). Validation happens inside the supplier's write unit, so a
//! rejected payment leaves no trace.

use super::engine::{compute_balances, outstanding, recompute_in_tx};
use super::money::{money, to_decimal, to_f64};
use super::LedgerService;
use crate::db::repository::{invoice, operation, supplier};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{
    BalanceSnapshot, Direction, InvoiceStatus, Operation, OperationCategory, PaymentCapacity,
    PaymentMethod, PaymentMode, PaymentRequest, PaymentResult, INITIAL_REFERENCE,
};

/// How a requested amount is split between channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSplit {
    pub from_credit: Decimal,
    pub from_cash: Decimal,
}

/// Decide the credit/cash split for a validated amount
///
/// `credit_only` fails with `InsufficientCredit` rather than partially
/// paying; `mixed` drains credit first.
pub fn split_payment(
    mode: PaymentMode,
    requested: Decimal,
    available_credit: Decimal,
) -> AppResult<PaymentSplit> {
    let available_credit = available_credit.max(Decimal::ZERO);
    match mode {
        PaymentMode::CreditOnly => {
            if available_credit < requested {
                return Err(AppError::new(ErrorCode::InsufficientCredit)
                    .with_detail("available_credit", to_f64(available_credit))
                    .with_detail("requested_amount", to_f64(requested)));
            }
            Ok(PaymentSplit {
                from_credit: requested,
                from_cash: Decimal::ZERO,
            })
        }
        PaymentMode::CashOnly => Ok(PaymentSplit {
            from_credit: Decimal::ZERO,
            from_cash: requested,
        }),
        PaymentMode::Mixed => {
            let from_credit = available_credit.min(requested);
            Ok(PaymentSplit {
                from_credit,
                from_cash: requested - from_credit,
            })
        }
    }
}

/// Status implied by a paid amount
pub fn status_after_payment(total_due: Decimal, amount_paid: Decimal) -> InvoiceStatus {
    if amount_paid >= total_due {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::PartiallyPaid
    }
}

fn validate_requested(value: f64) -> AppResult<Decimal> {
    if !value.is_finite() {
        return Err(AppError::invalid_amount(format!(
            "Payment amount must be a finite number, got {value}"
        )));
    }
    let requested = money(value);
    if requested != to_decimal(value) {
        return Err(AppError::invalid_amount(format!(
            "Payment amount must have at most 2 decimal places, got {value}"
        ))
        .with_detail("requested_amount", value));
    }
    if requested <= Decimal::ZERO {
        return Err(AppError::invalid_amount("Payment amount must be positive")
            .with_detail("requested_amount", value));
    }
    Ok(requested)
}

impl LedgerService {
    /// How much of `amount` the supplier's credit covers
    pub async fn capacity(&self, supplier_id: i64, amount: f64) -> AppResult<PaymentCapacity> {
        let requested = validate_requested(amount)?;
        let available = self.derive(supplier_id).await?.credit;
        let payable = available.min(requested);
        Ok(PaymentCapacity {
            supplier_id,
            requested_amount: to_f64(requested),
            available_credit: to_f64(available),
            payable_from_credit: to_f64(payable),
            fully_payable: available >= requested,
        })
    }

    /// Pay an invoice
    ///
    /// Checks, in order: invoice exists and is not cancelled, amount is
    /// positive and within the outstanding balance, a method is given when
    /// cash is involved, and (credit only) credit suffices. Then appends one
    /// `supplier_payment` per channel used, updates the invoice and
    /// recomputes the supplier, all in one transaction.
    pub async fn pay(&self, invoice_id: i64, req: PaymentRequest) -> AppResult<PaymentResult> {
        validate_optional_text(&req.reference, "reference", MAX_SHORT_TEXT_LEN)?;

        let supplier_id = {
            let mut conn = self.acquire().await?;
            invoice::find_by_id(&mut conn, invoice_id)
                .await?
                .ok_or_else(|| AppError::invoice_not_found(invoice_id))?
                .supplier_id
        };

        let _guard = self.locks.lock(supplier_id).await;
        let mut tx = self.begin().await?;

        // Write lock first, then read a snapshot nobody else can change
        if !supplier::mark_dirty(&mut *tx, supplier_id).await? {
            return Err(AppError::supplier_not_found(supplier_id));
        }
        let inv = invoice::find_by_id(&mut *tx, invoice_id)
            .await?
            .ok_or_else(|| AppError::invoice_not_found(invoice_id))?;
        let sup = supplier::find_by_id(&mut *tx, supplier_id)
            .await?
            .ok_or_else(|| AppError::supplier_not_found(supplier_id))?;

        if inv.status.is_cancelled() {
            return Err(AppError::new(ErrorCode::InvoiceCancelled).with_detail("invoice_id", invoice_id));
        }

        let requested = validate_requested(req.requested_amount)?;
        let remaining = outstanding(&inv)?;
        if requested > remaining {
            return Err(AppError::invalid_amount(format!(
                "Payment of {} exceeds outstanding balance {}",
                to_f64(requested),
                to_f64(remaining)
            ))
            .with_detail("requested_amount", to_f64(requested))
            .with_detail("outstanding", to_f64(remaining)));
        }

        let method = match (req.mode.needs_method(), req.payment_method) {
            (true, None) => {
                return Err(AppError::new(ErrorCode::MissingPaymentMethod)
                    .with_detail("mode", format!("{:?}", req.mode)));
            }
            (_, method) => method,
        };

        let reference = match req.reference {
            Some(r) if r == INITIAL_REFERENCE => {
                return Err(AppError::validation(format!(
                    "Reference '{INITIAL_REFERENCE}' is reserved for onboarding entries"
                )));
            }
            Some(r) => r,
            None => inv.number.clone(),
        };

        // Fresh credit from the ledger itself, not the cached column
        let available = if req.mode.uses_credit() {
            let invoices = invoice::find_billable_by_supplier(&mut *tx, supplier_id).await?;
            let entries = operation::find_supplier_entries(&mut *tx, supplier_id).await?;
            compute_balances(supplier_id, &invoices, &entries)?.credit
        } else {
            Decimal::ZERO
        };

        let split = split_payment(req.mode, requested, available)?;

        // ── writes ──
        let now = shared::util::now_millis();
        let settlement = |amount: Decimal, payment_method: Option<PaymentMethod>| Operation {
            id: shared::util::snowflake_id(),
            supplier_id: Some(supplier_id),
            agency_id: sup.agency_id,
            user_id: req.user_id,
            date: now,
            direction: Direction::Outflow,
            amount: to_f64(amount),
            category: OperationCategory::SupplierPayment,
            reference: Some(reference.clone()),
            payment_method,
            invoice_id: Some(invoice_id),
            created_at: now,
        };

        let mut operation_ids = Vec::with_capacity(2);
        if split.from_credit > Decimal::ZERO {
            let op = settlement(split.from_credit, None);
            operation::insert(&mut *tx, &op).await?;
            operation_ids.push(op.id);
        }
        if split.from_cash > Decimal::ZERO {
            let op = settlement(split.from_cash, method);
            operation::insert(&mut *tx, &op).await?;
            operation_ids.push(op.id);
        }

        let due = money(inv.total_due);
        let paid = money(inv.amount_paid) + requested;
        let status = status_after_payment(due, paid);
        invoice::record_payment(&mut *tx, invoice_id, to_f64(paid), status, now).await?;

        let balance = recompute_in_tx(&mut *tx, supplier_id).await?;
        Self::commit(tx).await?;

        tracing::info!(
            invoice_id,
            supplier_id,
            mode = ?req.mode,
            from_credit = %split.from_credit,
            from_cash = %split.from_cash,
            status = ?status,
            "Invoice payment applied"
        );

        Ok(PaymentResult {
            success: true,
            invoice_id,
            supplier_id,
            applied_from_credit: to_f64(split.from_credit),
            applied_from_cash: to_f64(split.from_cash),
            amount_paid: to_f64(paid),
            updated_invoice_status: status,
            operation_ids,
            balance: BalanceSnapshot {
                debt: balance.debt,
                credit: balance.credit,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn test_credit_only_requires_full_cover() {
        let split = split_payment(PaymentMode::CreditOnly, dec(200), dec(300)).unwrap();
        assert_eq!(split.from_credit, dec(200));
        assert_eq!(split.from_cash, Decimal::ZERO);

        let err = split_payment(PaymentMode::CreditOnly, dec(400), dec(300)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientCredit);
    }

    #[test]
    fn test_cash_only_ignores_credit() {
        let split = split_payment(PaymentMode::CashOnly, dec(200), dec(300)).unwrap();
        assert_eq!(split.from_credit, Decimal::ZERO);
        assert_eq!(split.from_cash, dec(200));
    }

    #[test]
    fn test_mixed_drains_credit_first() {
        let split = split_payment(PaymentMode::Mixed, dec(600), dec(300)).unwrap();
        assert_eq!(split.from_credit, dec(300));
        assert_eq!(split.from_cash, dec(300));

        let split = split_payment(PaymentMode::Mixed, dec(100), dec(300)).unwrap();
        assert_eq!(split.from_credit, dec(100));
        assert_eq!(split.from_cash, Decimal::ZERO);

        let split = split_payment(PaymentMode::Mixed, dec(100), Decimal::ZERO).unwrap();
        assert_eq!(split.from_credit, Decimal::ZERO);
        assert_eq!(split.from_cash, dec(100));
    }

    #[test]
    fn test_status_after_payment() {
        assert_eq!(status_after_payment(dec(1000), dec(1000)), InvoiceStatus::Paid);
        assert_eq!(
            status_after_payment(dec(1000), dec(700)),
            InvoiceStatus::PartiallyPaid
        );
    }

    #[test]
    fn test_validate_requested() {
        assert_eq!(validate_requested(600.0).unwrap(), dec(600));
        assert_eq!(validate_requested(0.0).unwrap_err().code, ErrorCode::InvalidAmount);
        assert_eq!(validate_requested(-5.0).unwrap_err().code, ErrorCode::InvalidAmount);
        assert_eq!(validate_requested(f64::NAN).unwrap_err().code, ErrorCode::InvalidAmount);
        assert_eq!(validate_requested(99.99).unwrap(), Decimal::new(9999, 2));
    }

    #[test]
    fn test_sub_cent_amounts_are_rejected() {
        for value in [100.005, 0.004, 12.3456] {
            let err = validate_requested(value).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidAmount);
            assert!(err.message.contains("2 decimal places"), "{}", err.message);
        }
    }
}
