//! Ledger Normalizer / Correction Routines
//!
//! Mechanical, idempotent repairs of historical ledger rows. A clean second
//! pass touches nothing. Each routine flags the suppliers it touched as
//! dirty; reconciliation clears the flag.
//!
//! The routines rewrite many suppliers' rows in one statement and take no
//! supplier locks. The dirty-flag update opens each transaction, so SQLite's
//! write lock is held before anything is read.
//!
//! Canonical sequence: [`normalize_signs`](LedgerService::normalize_signs) →
//! [`normalize_directions`](LedgerService::normalize_directions) →
//! [`reconcile_all_suppliers`](LedgerService::reconcile_all_suppliers), which
//! is what [`repair`](LedgerService::repair) runs.

use super::LedgerService;
use crate::db::repository::{operation, supplier};
use crate::utils::AppResult;
use futures::stream::{self, StreamExt};
use shared::models::{
    LedgerPreview, NormalizeReport, ReconcileReport, RepairReport, SupplierFailure,
};

impl LedgerService {
    /// Replace every negative ledger amount by its magnitude
    pub async fn normalize_signs(&self) -> AppResult<NormalizeReport> {
        let mut tx = self.begin().await?;
        operation::mark_negative_suppliers_dirty(&mut *tx).await?;
        let affected = operation::negative_supplier_ids(&mut *tx).await?;
        let touched = operation::flip_negative_amounts(&mut *tx).await?;
        Self::commit(tx).await?;

        tracing::info!(
            touched,
            suppliers = affected.len(),
            "normalize_signs: negative amounts replaced by magnitude"
        );
        Ok(NormalizeReport {
            touched,
            affected_suppliers: affected,
        })
    }

    /// Force supplier_advance / supplier_payment rows to `outflow`
    pub async fn normalize_directions(&self) -> AppResult<NormalizeReport> {
        let mut tx = self.begin().await?;
        operation::mark_misdirected_suppliers_dirty(&mut *tx).await?;
        let affected = operation::misdirected_supplier_ids(&mut *tx).await?;
        let touched = operation::fix_misdirected(&mut *tx).await?;
        Self::commit(tx).await?;

        tracing::info!(
            touched,
            suppliers = affected.len(),
            "normalize_directions: supplier entries set to outflow"
        );
        Ok(NormalizeReport {
            touched,
            affected_suppliers: affected,
        })
    }

    /// Recompute every supplier (active or not)
    pub async fn reconcile_all_suppliers(&self) -> AppResult<ReconcileReport> {
        let ids = supplier::find_all_ids(&mut *self.acquire().await?).await?;
        Ok(self.reconcile_suppliers(ids).await)
    }

    /// Recompute only suppliers whose balances are flagged dirty
    pub async fn reconcile_dirty(&self) -> AppResult<ReconcileReport> {
        let ids = supplier::find_dirty_ids(&mut *self.acquire().await?).await?;
        Ok(self.reconcile_suppliers(ids).await)
    }

    /// Recompute a set of suppliers with bounded parallelism
    ///
    /// Each supplier is its own unit of work: a failure is logged, recorded
    /// in the report and does not stop or undo the others.
    pub async fn reconcile_suppliers(&self, ids: Vec<i64>) -> ReconcileReport {
        let total = ids.len();
        let results: Vec<_> = stream::iter(ids)
            .map(|supplier_id| async move { (supplier_id, self.recompute(supplier_id).await) })
            .buffer_unordered(self.reconcile_concurrency.max(1))
            .collect()
            .await;

        let mut report = ReconcileReport::default();
        for (supplier_id, result) in results {
            match result {
                Ok(balance) => {
                    report.processed += 1;
                    if let Some(change) = balance.change() {
                        report.changes.push(change);
                    }
                }
                Err(err) => {
                    tracing::error!(
                        supplier_id,
                        code = %err.code,
                        error = %err.message,
                        "Supplier reconciliation failed"
                    );
                    report.failed += 1;
                    report.failures.push(SupplierFailure {
                        supplier_id,
                        code: err.code,
                        message: err.message,
                    });
                }
            }
        }
        report.changes.sort_by_key(|c| c.supplier_id);
        report.failures.sort_by_key(|f| f.supplier_id);

        tracing::info!(
            total,
            processed = report.processed,
            changed = report.changes.len(),
            failed = report.failed,
            "Supplier reconciliation finished"
        );
        report
    }

    /// Canonical repair sequence
    pub async fn repair(&self) -> AppResult<RepairReport> {
        let signs = self.normalize_signs().await?;
        let directions = self.normalize_directions().await?;
        let reconcile = self.reconcile_all_suppliers().await?;
        Ok(RepairReport {
            signs,
            directions,
            reconcile,
        })
    }

    /// Count what a repair would touch, without writing
    pub async fn preview(&self) -> AppResult<LedgerPreview> {
        let mut conn = self.acquire().await?;
        Ok(LedgerPreview {
            negative_amounts: operation::count_negative(&mut conn).await?,
            misdirected_entries: operation::count_misdirected(&mut conn).await?,
            dirty_suppliers: supplier::count_dirty(&mut conn).await?,
            total_suppliers: supplier::count_all(&mut conn).await?,
        })
    }
}
