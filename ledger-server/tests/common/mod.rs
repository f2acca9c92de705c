//! Shared fixtures for the ledger integration tests
#![allow(dead_code)]

use ledger_server::{DbService, LedgerService};
use shared::models::{
    Direction, Invoice, InvoiceCreate, InvoiceStatus, OperationCategory, OperationCreate,
    Supplier, SupplierCreate,
};

pub const AGENCY: i64 = 1;

pub async fn setup() -> (DbService, LedgerService) {
    let db = DbService::in_memory().await.expect("in-memory db");
    let ledger = LedgerService::new(db.pool.clone());
    (db, ledger)
}

pub fn supplier_payload(name: &str) -> SupplierCreate {
    SupplierCreate {
        agency_id: AGENCY,
        name: name.into(),
        email: None,
        phone: None,
        notes: None,
        initial_debt: None,
        initial_credit: None,
        user_id: None,
    }
}

pub async fn supplier(ledger: &LedgerService, name: &str) -> Supplier {
    ledger
        .create_supplier(supplier_payload(name))
        .await
        .expect("create supplier")
}

pub async fn invoice(
    ledger: &LedgerService,
    supplier_id: i64,
    number: &str,
    total_due: f64,
    amount_paid: f64,
) -> Invoice {
    ledger
        .create_invoice(InvoiceCreate {
            supplier_id,
            number: number.into(),
            total_due,
            amount_paid: Some(amount_paid),
            status: Some(InvoiceStatus::Sent),
        })
        .await
        .expect("create invoice")
}

pub async fn advance(ledger: &LedgerService, supplier_id: i64, amount: f64) {
    ledger
        .record_operation(OperationCreate {
            supplier_id: Some(supplier_id),
            agency_id: AGENCY,
            user_id: None,
            date: None,
            direction: Direction::Outflow,
            amount,
            category: OperationCategory::SupplierAdvance,
            reference: Some("advance".into()),
            payment_method: None,
            invoice_id: None,
        })
        .await
        .expect("record advance");
}

/// Insert a ledger row bypassing every write-time check (legacy data)
pub async fn insert_raw_operation(
    db: &DbService,
    id: i64,
    supplier_id: i64,
    category: &str,
    direction: &str,
    amount: f64,
    reference: Option<&str>,
) {
    sqlx::query(
        "INSERT INTO operation (id, supplier_id, agency_id, user_id, date, direction, amount, category, reference, payment_method, invoice_id, created_at) VALUES (?1, ?2, ?3, NULL, ?1, ?4, ?5, ?6, ?7, NULL, NULL, 0)",
    )
    .bind(id)
    .bind(supplier_id)
    .bind(AGENCY)
    .bind(direction)
    .bind(amount)
    .bind(category)
    .bind(reference)
    .execute(&db.pool)
    .await
    .expect("raw operation insert");
}

pub fn assert_money(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {expected}, got {actual}"
    );
}
