//! Write paths for suppliers, invoices and ledger operations
//!
//! Anything that can move a supplier's balance runs under the supplier lock
//! in one transaction and ends with a recompute, so the cached `debt` and
//! `credit` are never observed stale after a successful call.

use super::engine::recompute_in_tx;
use super::money::{money, money_eq, to_f64};
use super::LedgerService;
use crate::db::repository::{invoice, operation, supplier, RepoError};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_amount,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{
    Direction, INITIAL_REFERENCE, Invoice, InvoiceCreate, InvoiceStatus, InvoiceUpdate, Operation,
    OperationCategory, OperationCreate, Supplier, SupplierCreate, SupplierUpdate,
};

/// Resolve the status an invoice should carry for given amounts
///
/// `paid` holds exactly when the invoice is settled, so a settled invoice
/// cannot be cancelled. Without an explicit status the invoice is a draft
/// until something has been paid on it.
pub fn resolve_invoice_status(
    requested: Option<InvoiceStatus>,
    total_due: Decimal,
    amount_paid: Decimal,
) -> AppResult<InvoiceStatus> {
    let settled = money_eq(to_f64(total_due), to_f64(amount_paid));
    match requested {
        Some(InvoiceStatus::Cancelled) if settled => Err(AppError::with_message(
            ErrorCode::InvoiceAlreadyPaid,
            "A fully paid invoice cannot be cancelled",
        )
        .with_detail("total_due", to_f64(total_due))
        .with_detail("amount_paid", to_f64(amount_paid))),
        Some(InvoiceStatus::Cancelled) => Ok(InvoiceStatus::Cancelled),
        _ if settled => Ok(InvoiceStatus::Paid),
        Some(InvoiceStatus::Paid) => Err(AppError::validation(format!(
            "Invoice cannot be marked paid: {} of {} paid",
            to_f64(amount_paid),
            to_f64(total_due)
        ))),
        Some(status) => Ok(status),
        None if amount_paid > Decimal::ZERO => Ok(InvoiceStatus::PartiallyPaid),
        None => Ok(InvoiceStatus::Draft),
    }
}

fn validate_invoice_amounts(total_due: f64, amount_paid: f64) -> AppResult<(Decimal, Decimal)> {
    validate_amount(total_due, "total_due")?;
    validate_amount(amount_paid, "amount_paid")?;
    let due = money(total_due);
    let paid = money(amount_paid);
    if due <= Decimal::ZERO {
        return Err(AppError::invalid_amount("total_due must be positive"));
    }
    if paid > due {
        return Err(AppError::invalid_amount(format!(
            "amount_paid ({amount_paid}) exceeds total_due ({total_due})"
        ))
        .with_detail("total_due", total_due)
        .with_detail("amount_paid", amount_paid));
    }
    Ok((due, paid))
}

fn reject_reserved_reference(reference: &Option<String>) -> AppResult<()> {
    if reference.as_deref() == Some(INITIAL_REFERENCE) {
        return Err(AppError::validation(format!(
            "Reference '{INITIAL_REFERENCE}' is reserved for onboarding entries"
        )));
    }
    Ok(())
}

fn duplicate_invoice(err: RepoError, number: &str) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::already_exists(format!("Invoice {number}")),
        other => other.into(),
    }
}

impl LedgerService {
    // ==================== Suppliers ====================

    /// Create a supplier, seeding any declared opening balances
    ///
    /// Opening debt becomes an `INITIAL` supplier_payment, opening credit an
    /// `INITIAL` supplier_advance. The cached balances are then derived like
    /// any other supplier's.
    pub async fn create_supplier(&self, data: SupplierCreate) -> AppResult<Supplier> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&data.email, "email", MAX_EMAIL_LEN)?;
        validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
        if let Some(v) = data.initial_debt {
            validate_amount(v, "initial_debt")?;
        }
        if let Some(v) = data.initial_credit {
            validate_amount(v, "initial_credit")?;
        }
        let initial_debt = money(data.initial_debt.unwrap_or(0.0));
        let initial_credit = money(data.initial_credit.unwrap_or(0.0));

        let now = shared::util::now_millis();
        let seeds: Vec<(OperationCategory, Decimal)> = [
            (OperationCategory::SupplierPayment, initial_debt),
            (OperationCategory::SupplierAdvance, initial_credit),
        ]
        .into_iter()
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .collect();

        let record = Supplier {
            id: shared::util::snowflake_id(),
            agency_id: data.agency_id,
            name: data.name.trim().to_string(),
            email: data.email,
            phone: data.phone,
            notes: data.notes,
            debt: 0.0,
            credit: 0.0,
            balance_dirty: !seeds.is_empty(),
            balance_updated_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.locks.lock(record.id).await;
        let mut tx = self.begin().await?;
        supplier::insert(&mut *tx, &record).await?;
        for (category, amount) in &seeds {
            let seed = Operation {
                id: shared::util::snowflake_id(),
                supplier_id: Some(record.id),
                agency_id: record.agency_id,
                user_id: data.user_id,
                date: now,
                direction: Direction::Outflow,
                amount: to_f64(*amount),
                category: *category,
                reference: Some(INITIAL_REFERENCE.to_string()),
                payment_method: None,
                invoice_id: None,
                created_at: now,
            };
            operation::insert(&mut *tx, &seed).await?;
        }
        if !seeds.is_empty() {
            recompute_in_tx(&mut *tx, record.id).await?;
        }
        let created = supplier::find_by_id(&mut *tx, record.id)
            .await?
            .ok_or_else(|| AppError::supplier_not_found(record.id))?;
        Self::commit(tx).await?;

        tracing::info!(
            supplier_id = created.id,
            debt = created.debt,
            credit = created.credit,
            "Supplier created"
        );
        Ok(created)
    }

    /// Update profile fields; balances are never written here
    pub async fn update_supplier(&self, id: i64, data: SupplierUpdate) -> AppResult<Supplier> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.email, "email", MAX_EMAIL_LEN)?;
        validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;

        let mut conn = self.acquire().await?;
        supplier::update(&mut conn, id, &data)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => AppError::supplier_not_found(id),
                other => other.into(),
            })?;
        supplier::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::supplier_not_found(id))
    }

    pub async fn get_supplier(&self, id: i64) -> AppResult<Supplier> {
        let mut conn = self.acquire().await?;
        supplier::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::supplier_not_found(id))
    }

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let mut conn = self.acquire().await?;
        Ok(supplier::find_all(&mut conn).await?)
    }

    /// All invoices of a supplier, cancelled ones included
    pub async fn supplier_invoices(&self, supplier_id: i64) -> AppResult<Vec<Invoice>> {
        let mut conn = self.acquire().await?;
        supplier::find_by_id(&mut conn, supplier_id)
            .await?
            .ok_or_else(|| AppError::supplier_not_found(supplier_id))?;
        Ok(invoice::find_by_supplier(&mut conn, supplier_id).await?)
    }

    /// Supplier-category ledger entries, oldest first
    pub async fn supplier_operations(&self, supplier_id: i64) -> AppResult<Vec<Operation>> {
        let mut conn = self.acquire().await?;
        supplier::find_by_id(&mut conn, supplier_id)
            .await?
            .ok_or_else(|| AppError::supplier_not_found(supplier_id))?;
        Ok(operation::find_supplier_entries(&mut conn, supplier_id).await?)
    }

    // ==================== Invoices ====================

    pub async fn get_invoice(&self, id: i64) -> AppResult<Invoice> {
        let mut conn = self.acquire().await?;
        invoice::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::invoice_not_found(id))
    }

    /// Settlement entries linked to an invoice, oldest first
    pub async fn invoice_operations(&self, invoice_id: i64) -> AppResult<Vec<Operation>> {
        let mut conn = self.acquire().await?;
        invoice::find_by_id(&mut conn, invoice_id)
            .await?
            .ok_or_else(|| AppError::invoice_not_found(invoice_id))?;
        Ok(operation::find_by_invoice(&mut conn, invoice_id).await?)
    }

    /// Create an invoice and refresh the supplier's debt
    pub async fn create_invoice(&self, data: InvoiceCreate) -> AppResult<Invoice> {
        validate_required_text(&data.number, "number", MAX_SHORT_TEXT_LEN)?;
        let (due, paid) = validate_invoice_amounts(data.total_due, data.amount_paid.unwrap_or(0.0))?;
        let status = resolve_invoice_status(data.status, due, paid)?;

        let now = shared::util::now_millis();
        let record = Invoice {
            id: shared::util::snowflake_id(),
            supplier_id: data.supplier_id,
            number: data.number.trim().to_string(),
            total_due: to_f64(due),
            amount_paid: to_f64(paid),
            status,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.locks.lock(record.supplier_id).await;
        let mut tx = self.begin().await?;
        if !supplier::mark_dirty(&mut *tx, record.supplier_id).await? {
            return Err(AppError::supplier_not_found(record.supplier_id));
        }
        invoice::insert(&mut *tx, &record)
            .await
            .map_err(|e| duplicate_invoice(e, &record.number))?;
        recompute_in_tx(&mut *tx, record.supplier_id).await?;
        Self::commit(tx).await?;

        tracing::info!(
            invoice_id = record.id,
            supplier_id = record.supplier_id,
            total_due = record.total_due,
            status = ?record.status,
            "Invoice created"
        );
        Ok(record)
    }

    /// Update number, total or status; `amount_paid` only moves through payments
    pub async fn update_invoice(&self, id: i64, data: InvoiceUpdate) -> AppResult<Invoice> {
        if let Some(number) = &data.number {
            validate_required_text(number, "number", MAX_SHORT_TEXT_LEN)?;
        }

        let supplier_id = self.get_invoice(id).await?.supplier_id;
        let _guard = self.locks.lock(supplier_id).await;
        let mut tx = self.begin().await?;
        if !supplier::mark_dirty(&mut *tx, supplier_id).await? {
            return Err(AppError::supplier_not_found(supplier_id));
        }
        let current = invoice::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::invoice_not_found(id))?;

        let total_due = data.total_due.unwrap_or(current.total_due);
        let (due, paid) = validate_invoice_amounts(total_due, current.amount_paid)?;
        // Derived statuses are re-derived unless the caller names one
        let requested = data.status.or(match current.status {
            InvoiceStatus::Paid | InvoiceStatus::PartiallyPaid => None,
            other => Some(other),
        });
        let status = match (data.status, current.status) {
            // already cancelled and no transition requested
            (None, InvoiceStatus::Cancelled) => InvoiceStatus::Cancelled,
            _ => resolve_invoice_status(requested, due, paid)?,
        };

        let resolved = InvoiceUpdate {
            number: data.number.map(|n| n.trim().to_string()),
            total_due: data.total_due.map(|_| to_f64(due)),
            status: Some(status),
        };
        let number = resolved.number.clone().unwrap_or_else(|| current.number.clone());
        invoice::update(&mut *tx, id, &resolved)
            .await
            .map_err(|e| duplicate_invoice(e, &number))?;
        recompute_in_tx(&mut *tx, supplier_id).await?;
        let updated = invoice::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::invoice_not_found(id))?;
        Self::commit(tx).await?;

        tracing::info!(invoice_id = id, supplier_id, status = ?updated.status, "Invoice updated");
        Ok(updated)
    }

    // ==================== Operations ====================

    pub async fn get_operation(&self, id: i64) -> AppResult<Operation> {
        let mut conn = self.acquire().await?;
        operation::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::OperationNotFound, format!("Operation {id} not found"))
                    .with_detail("operation_id", id)
            })
    }

    /// Record a cash-register movement
    ///
    /// Supplier-category entries must be `outflow`, belong to an existing
    /// supplier and go through the supplier's write unit. Invoice
    /// settlements and `INITIAL` seeds have dedicated paths and are refused.
    pub async fn record_operation(&self, data: OperationCreate) -> AppResult<Operation> {
        validate_amount(data.amount, "amount")?;
        validate_optional_text(&data.reference, "reference", MAX_SHORT_TEXT_LEN)?;

        let now = shared::util::now_millis();
        let record = Operation {
            id: shared::util::snowflake_id(),
            supplier_id: data.supplier_id,
            agency_id: data.agency_id,
            user_id: data.user_id,
            date: data.date.unwrap_or(now),
            direction: data.direction,
            amount: to_f64(money(data.amount)),
            category: data.category,
            reference: data.reference,
            payment_method: data.payment_method,
            invoice_id: data.invoice_id,
            created_at: now,
        };

        if !record.category.is_supplier() {
            let mut conn = self.acquire().await?;
            operation::insert(&mut conn, &record).await?;
            tracing::debug!(operation_id = record.id, category = %record.category, "Operation recorded");
            return Ok(record);
        }

        let supplier_id = record.supplier_id.ok_or_else(|| {
            AppError::validation(format!("{} entries require a supplier_id", record.category))
        })?;
        if record.direction != Direction::Outflow {
            return Err(AppError::inconsistent_entry(format!(
                "{} entries must be outflow, got {:?}",
                record.category, record.direction
            ))
            .with_detail("category", record.category.as_str()));
        }
        if record.invoice_id.is_some() {
            return Err(AppError::validation(
                "Invoice settlements must go through the payment endpoint",
            ));
        }
        reject_reserved_reference(&record.reference)?;

        let _guard = self.locks.lock(supplier_id).await;
        let mut tx = self.begin().await?;
        if !supplier::mark_dirty(&mut *tx, supplier_id).await? {
            return Err(AppError::supplier_not_found(supplier_id));
        }
        operation::insert(&mut *tx, &record).await?;
        let balance = recompute_in_tx(&mut *tx, supplier_id).await?;
        Self::commit(tx).await?;

        tracing::info!(
            operation_id = record.id,
            supplier_id,
            category = %record.category,
            amount = record.amount,
            debt = balance.debt,
            credit = balance.credit,
            "Supplier ledger entry recorded"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(
            resolve_invoice_status(None, dec(100), Decimal::ZERO).unwrap(),
            InvoiceStatus::Draft
        );
        assert_eq!(
            resolve_invoice_status(None, dec(100), dec(40)).unwrap(),
            InvoiceStatus::PartiallyPaid
        );
        assert_eq!(
            resolve_invoice_status(Some(InvoiceStatus::Sent), dec(100), dec(100)).unwrap(),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn test_paid_requires_settlement() {
        let err = resolve_invoice_status(Some(InvoiceStatus::Paid), dec(100), dec(40)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_cancel_rules() {
        assert_eq!(
            resolve_invoice_status(Some(InvoiceStatus::Cancelled), dec(100), dec(40)).unwrap(),
            InvoiceStatus::Cancelled
        );
        let err = resolve_invoice_status(Some(InvoiceStatus::Cancelled), dec(100), dec(100))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvoiceAlreadyPaid);
    }

    #[test]
    fn test_invoice_amount_checks() {
        assert!(validate_invoice_amounts(100.0, 0.0).is_ok());
        assert_eq!(
            validate_invoice_amounts(0.0, 0.0).unwrap_err().code,
            ErrorCode::InvalidAmount
        );
        assert_eq!(
            validate_invoice_amounts(100.0, 120.0).unwrap_err().code,
            ErrorCode::InvalidAmount
        );
        assert_eq!(
            validate_invoice_amounts(-1.0, 0.0).unwrap_err().code,
            ErrorCode::InvalidAmount
        );
    }

    #[test]
    fn test_reserved_reference() {
        assert!(reject_reserved_reference(&Some("INITIAL".into())).is_err());
        assert!(reject_reserved_reference(&Some("INV-1".into())).is_ok());
        assert!(reject_reserved_reference(&None).is_ok());
    }
}
