//! Invoice Repository

use super::{RepoError, RepoResult};
use shared::models::{Invoice, InvoiceStatus, InvoiceUpdate};
use sqlx::SqliteConnection;

const INVOICE_SELECT: &str = "SELECT id, supplier_id, number, total_due, amount_paid, status, created_at, updated_at FROM invoice";

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Invoice>> {
    let sql = format!("{INVOICE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Invoice>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn find_by_supplier(
    conn: &mut SqliteConnection,
    supplier_id: i64,
) -> RepoResult<Vec<Invoice>> {
    let sql = format!("{INVOICE_SELECT} WHERE supplier_id = ? ORDER BY created_at, id");
    let rows = sqlx::query_as::<_, Invoice>(&sql)
        .bind(supplier_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

/// Invoices that still carry an obligation (everything but `cancelled`)
pub async fn find_billable_by_supplier(
    conn: &mut SqliteConnection,
    supplier_id: i64,
) -> RepoResult<Vec<Invoice>> {
    let sql = format!(
        "{INVOICE_SELECT} WHERE supplier_id = ? AND status <> 'cancelled' ORDER BY created_at, id"
    );
    let rows = sqlx::query_as::<_, Invoice>(&sql)
        .bind(supplier_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn insert(conn: &mut SqliteConnection, invoice: &Invoice) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO invoice (id, supplier_id, number, total_due, amount_paid, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(invoice.id)
    .bind(invoice.supplier_id)
    .bind(&invoice.number)
    .bind(invoice.total_due)
    .bind(invoice.amount_paid)
    .bind(invoice.status)
    .bind(invoice.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update(conn: &mut SqliteConnection, id: i64, data: &InvoiceUpdate) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE invoice SET number = COALESCE(?1, number), total_due = COALESCE(?2, total_due), status = COALESCE(?3, status), updated_at = ?4 WHERE id = ?5",
    )
    .bind(&data.number)
    .bind(data.total_due)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Invoice {id} not found")));
    }
    Ok(())
}

/// Payment processor write: new paid amount and status
pub async fn record_payment(
    conn: &mut SqliteConnection,
    id: i64,
    amount_paid: f64,
    status: InvoiceStatus,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE invoice SET amount_paid = ?1, status = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(amount_paid)
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
