//! Ledger Operation Repository
//!
//! Append-oriented: rows are inserted by the cash register and the payment
//! processor, and only ever rewritten by the normalizer (sign, direction).

use super::RepoResult;
use shared::models::Operation;
use sqlx::SqliteConnection;

const OPERATION_SELECT: &str = "SELECT id, supplier_id, agency_id, user_id, date, direction, amount, category, reference, payment_method, invoice_id, created_at FROM operation";

/// Predicate for supplier entries violating the category-direction invariant
const MISDIRECTED: &str =
    "category IN ('supplier_advance', 'supplier_payment') AND direction <> 'outflow'";

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Operation>> {
    let sql = format!("{OPERATION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Operation>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Supplier-category entries of one supplier, oldest first
pub async fn find_supplier_entries(
    conn: &mut SqliteConnection,
    supplier_id: i64,
) -> RepoResult<Vec<Operation>> {
    let sql = format!(
        "{OPERATION_SELECT} WHERE supplier_id = ? AND category IN ('supplier_advance', 'supplier_payment') ORDER BY date, id"
    );
    let rows = sqlx::query_as::<_, Operation>(&sql)
        .bind(supplier_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn find_by_invoice(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> RepoResult<Vec<Operation>> {
    let sql = format!("{OPERATION_SELECT} WHERE invoice_id = ? ORDER BY date, id");
    let rows = sqlx::query_as::<_, Operation>(&sql)
        .bind(invoice_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn insert(conn: &mut SqliteConnection, op: &Operation) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO operation (id, supplier_id, agency_id, user_id, date, direction, amount, category, reference, payment_method, invoice_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(op.id)
    .bind(op.supplier_id)
    .bind(op.agency_id)
    .bind(op.user_id)
    .bind(op.date)
    .bind(op.direction)
    .bind(op.amount)
    .bind(op.category)
    .bind(&op.reference)
    .bind(op.payment_method)
    .bind(op.invoice_id)
    .bind(op.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

// ── Normalizer support ─────────────────────────────────────────────

pub async fn count_negative(conn: &mut SqliteConnection) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM operation WHERE amount < 0")
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Flag suppliers owning negative rows; the first write of a sign repair
pub async fn mark_negative_suppliers_dirty(conn: &mut SqliteConnection) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE supplier SET balance_dirty = 1 WHERE id IN (SELECT supplier_id FROM operation WHERE amount < 0)",
    )
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn negative_supplier_ids(conn: &mut SqliteConnection) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT supplier_id FROM operation WHERE amount < 0 AND supplier_id IS NOT NULL ORDER BY supplier_id",
    )
    .fetch_all(conn)
    .await?;
    Ok(ids)
}

/// Replace every negative amount by its magnitude; returns rows touched
pub async fn flip_negative_amounts(conn: &mut SqliteConnection) -> RepoResult<u64> {
    let result = sqlx::query("UPDATE operation SET amount = ABS(amount) WHERE amount < 0")
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_misdirected(conn: &mut SqliteConnection) -> RepoResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM operation WHERE {MISDIRECTED}");
    let count = sqlx::query_scalar::<_, i64>(&sql).fetch_one(conn).await?;
    Ok(count)
}

pub async fn mark_misdirected_suppliers_dirty(conn: &mut SqliteConnection) -> RepoResult<u64> {
    let sql = format!(
        "UPDATE supplier SET balance_dirty = 1 WHERE id IN (SELECT supplier_id FROM operation WHERE {MISDIRECTED})"
    );
    let result = sqlx::query(&sql).execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn misdirected_supplier_ids(conn: &mut SqliteConnection) -> RepoResult<Vec<i64>> {
    let sql = format!(
        "SELECT DISTINCT supplier_id FROM operation WHERE {MISDIRECTED} AND supplier_id IS NOT NULL ORDER BY supplier_id"
    );
    let ids = sqlx::query_scalar::<_, i64>(&sql).fetch_all(conn).await?;
    Ok(ids)
}

/// Force supplier-category entries to `outflow`; returns rows touched
pub async fn fix_misdirected(conn: &mut SqliteConnection) -> RepoResult<u64> {
    let sql = format!("UPDATE operation SET direction = 'outflow' WHERE {MISDIRECTED}");
    let result = sqlx::query(&sql).execute(conn).await?;
    Ok(result.rows_affected())
}
