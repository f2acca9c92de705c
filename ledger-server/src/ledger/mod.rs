//! Supplier Ledger - 供应商账务核心
//!
//! # 模块结构
//!
//! - [`entry`] - Operation → tagged [`LedgerEntry`] classification
//! - [`engine`] - balance derivation and cache write (`recompute`)
//! - [`normalizer`] - sign/direction repairs, batch reconciliation
//! - [`payment`] - mixed-mode invoice payment, credit capacity
//! - [`writes`] - supplier / invoice / operation write paths
//! - [`money`] - Decimal helpers
//! - [`locks`] - per-supplier serialization
//!
//! Every write that can move a supplier's balance runs as one unit:
//! supplier lock → transaction (first statement takes the write lock) →
//! ledger/invoice writes → recompute → commit.

pub mod engine;
pub mod entry;
pub mod locks;
pub mod money;
pub mod normalizer;
pub mod payment;
pub mod writes;

pub use engine::{ComputedBalance, compute_balances};
pub use entry::{LedgerEntry, SettlementChannel, classify};
pub use locks::SupplierLocks;

use crate::db::repository::RepoError;
use crate::utils::AppResult;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Default number of suppliers reconciled in parallel
pub const DEFAULT_RECONCILE_CONCURRENCY: usize = 4;

/// Ledger service - owns the pool and the per-supplier locks
///
/// Cheap to clone; all clones share the same locks.
#[derive(Clone, Debug)]
pub struct LedgerService {
    pool: SqlitePool,
    locks: SupplierLocks,
    reconcile_concurrency: usize,
}

impl LedgerService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: SupplierLocks::new(),
            reconcile_concurrency: DEFAULT_RECONCILE_CONCURRENCY,
        }
    }

    /// Bound on suppliers recomputed at once by batch reconciliation
    pub fn with_reconcile_concurrency(mut self, concurrency: usize) -> Self {
        self.reconcile_concurrency = concurrency.max(1);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn locks(&self) -> &SupplierLocks {
        &self.locks
    }

    pub(crate) async fn acquire(&self) -> AppResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await.map_err(RepoError::from)?)
    }

    pub(crate) async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await.map_err(RepoError::from)?)
    }

    pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
        tx.commit().await.map_err(RepoError::from)?;
        Ok(())
    }
}
