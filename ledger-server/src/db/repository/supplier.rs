//! Supplier Repository

use super::{RepoError, RepoResult};
use shared::models::{Supplier, SupplierUpdate};
use sqlx::SqliteConnection;

const SUPPLIER_SELECT: &str = "SELECT id, agency_id, name, email, phone, notes, debt, credit, balance_dirty, balance_updated_at, is_active, created_at, updated_at FROM supplier";

pub async fn find_all(conn: &mut SqliteConnection) -> RepoResult<Vec<Supplier>> {
    let sql = format!("{SUPPLIER_SELECT} WHERE is_active = 1 ORDER BY name");
    let rows = sqlx::query_as::<_, Supplier>(&sql).fetch_all(conn).await?;
    Ok(rows)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Supplier>> {
    let sql = format!("{SUPPLIER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Supplier>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// All supplier ids, including inactive ones (reconciliation covers everyone)
pub async fn find_all_ids(conn: &mut SqliteConnection) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM supplier ORDER BY id")
        .fetch_all(conn)
        .await?;
    Ok(ids)
}

pub async fn find_dirty_ids(conn: &mut SqliteConnection) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM supplier WHERE balance_dirty = 1 ORDER BY id",
    )
    .fetch_all(conn)
    .await?;
    Ok(ids)
}

pub async fn count_all(conn: &mut SqliteConnection) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM supplier")
        .fetch_one(conn)
        .await?;
    Ok(count)
}

pub async fn count_dirty(conn: &mut SqliteConnection) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM supplier WHERE balance_dirty = 1")
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Insert a new supplier with zero balances
pub async fn insert(conn: &mut SqliteConnection, supplier: &Supplier) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO supplier (id, agency_id, name, email, phone, notes, debt, credit, balance_dirty, balance_updated_at, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, NULL, ?8, ?9, ?9)",
    )
    .bind(supplier.id)
    .bind(supplier.agency_id)
    .bind(&supplier.name)
    .bind(&supplier.email)
    .bind(&supplier.phone)
    .bind(&supplier.notes)
    .bind(supplier.balance_dirty)
    .bind(supplier.is_active)
    .bind(supplier.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Update profile fields; balances are untouched
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    data: &SupplierUpdate,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE supplier SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), notes = COALESCE(?4, notes), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.notes)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Supplier {id} not found")));
    }
    Ok(())
}

/// Flag the cached balances as stale
///
/// Also the first statement of every ledger transaction: it takes the SQLite
/// write lock and tells the caller whether the supplier exists.
pub async fn mark_dirty(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE supplier SET balance_dirty = 1 WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Write both cached balances in one statement and clear the dirty flag
pub async fn store_balance(
    conn: &mut SqliteConnection,
    id: i64,
    debt: f64,
    credit: f64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE supplier SET debt = ?1, credit = ?2, balance_dirty = 0, balance_updated_at = ?3, updated_at = ?3 WHERE id = ?4",
    )
    .bind(debt)
    .bind(credit)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Balances already match the ledger: only clear the flag
pub async fn clear_dirty(conn: &mut SqliteConnection, id: i64, now: i64) -> RepoResult<()> {
    sqlx::query("UPDATE supplier SET balance_dirty = 0, balance_updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
