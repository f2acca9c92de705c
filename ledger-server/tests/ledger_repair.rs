//! 账目修复例程 + 批量对账 集成测试

mod common;

use common::*;
use ledger_server::{DbService, ErrorCode, LedgerService};
use shared::models::{Direction, InconsistencyKind};

#[tokio::test]
async fn normalize_signs_flips_negative_amounts() {
    let (db, ledger) = setup().await;
    let s = supplier(&ledger, "Acme").await;
    insert_raw_operation(&db, 1, s.id, "supplier_payment", "outflow", -200.0, Some("legacy")).await;

    let preview = ledger.preview().await.unwrap();
    assert_eq!(preview.negative_amounts, 1);
    assert!(!preview.is_clean());

    let report = ledger.normalize_signs().await.unwrap();
    assert_eq!(report.touched, 1);
    assert_eq!(report.affected_suppliers, vec![s.id]);

    let op = ledger.get_operation(1).await.unwrap();
    assert_money(op.amount, 200.0);
    assert!(ledger.get_supplier(s.id).await.unwrap().balance_dirty);

    let again = ledger.normalize_signs().await.unwrap();
    assert_eq!(again.touched, 0);
    assert!(again.affected_suppliers.is_empty());
}

#[tokio::test]
async fn normalize_directions_forces_outflow() {
    let (db, ledger) = setup().await;
    let s = supplier(&ledger, "Acme").await;
    insert_raw_operation(&db, 1, s.id, "supplier_advance", "inflow", 500.0, None).await;

    // counted by magnitude, reported as inconsistent
    let balance = ledger.recompute(s.id).await.unwrap();
    assert_money(balance.credit, 500.0);
    assert_eq!(balance.breakdown.inconsistencies.len(), 1);
    assert_eq!(
        balance.breakdown.inconsistencies[0].kind,
        InconsistencyKind::WrongDirection
    );

    let report = ledger.normalize_directions().await.unwrap();
    assert_eq!(report.touched, 1);
    assert_eq!(ledger.get_operation(1).await.unwrap().direction, Direction::Outflow);

    let balance = ledger.recompute(s.id).await.unwrap();
    assert!(balance.breakdown.inconsistencies.is_empty());
    assert_money(balance.credit, 500.0);
}

#[tokio::test]
async fn repairs_restore_invariant_and_stay_idempotent() {
    let (db, ledger) = setup().await;
    let a = supplier(&ledger, "Acme").await;
    let b = supplier(&ledger, "Bolt").await;
    insert_raw_operation(&db, 1, a.id, "supplier_payment", "inflow", -75.5, None).await;
    insert_raw_operation(&db, 2, a.id, "supplier_advance", "outflow", -120.0, None).await;
    insert_raw_operation(&db, 3, b.id, "supplier_advance", "inflow", 300.0, None).await;
    // non-supplier rows keep their direction
    insert_raw_operation(&db, 4, b.id, "sale", "inflow", 42.0, None).await;

    let preview = ledger.preview().await.unwrap();
    assert_eq!(preview.negative_amounts, 2);
    assert_eq!(preview.misdirected_entries, 2);

    // routines compose in any order
    let directions = ledger.normalize_directions().await.unwrap();
    let signs = ledger.normalize_signs().await.unwrap();
    assert_eq!(directions.touched, 2);
    assert_eq!(signs.touched, 2);

    let preview = ledger.preview().await.unwrap();
    assert_eq!(preview.negative_amounts, 0);
    assert_eq!(preview.misdirected_entries, 0);
    assert_eq!(ledger.get_operation(4).await.unwrap().direction, Direction::Inflow);

    for _ in 0..2 {
        assert_eq!(ledger.normalize_signs().await.unwrap().touched, 0);
        assert_eq!(ledger.normalize_directions().await.unwrap().touched, 0);
    }

    let report = ledger.reconcile_dirty().await.unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 0);
    assert!(ledger.preview().await.unwrap().is_clean());

    let stored = ledger.get_supplier(b.id).await.unwrap();
    assert_money(stored.credit, 300.0);
}

#[tokio::test]
async fn reconcile_reports_change_log() {
    let (db, ledger) = setup().await;
    let a = supplier(&ledger, "Acme").await;
    let b = supplier(&ledger, "Bolt").await;
    advance(&ledger, a.id, 100.0).await;

    // stale cache written behind the engine's back
    sqlx::query("UPDATE supplier SET credit = 999 WHERE id = ?")
        .bind(a.id)
        .execute(&db.pool)
        .await
        .unwrap();

    let report = ledger.reconcile_all_suppliers().await.unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.changes.len(), 1);
    let change = &report.changes[0];
    assert_eq!(change.supplier_id, a.id);
    assert_money(change.old_credit, 999.0);
    assert_money(change.new_credit, 100.0);

    let second = ledger.reconcile_all_suppliers().await.unwrap();
    assert!(second.changes.is_empty());
    assert_money(ledger.get_supplier(b.id).await.unwrap().credit, 0.0);
}

#[tokio::test]
async fn reconcile_isolates_malformed_supplier() {
    let (db, ledger) = setup().await;
    let good = supplier(&ledger, "Good").await;
    let bad = supplier(&ledger, "Bad").await;
    advance(&ledger, good.id, 80.0).await;
    let inv = invoice(&ledger, bad.id, "INV-1", 100.0, 0.0).await;

    sqlx::query("UPDATE invoice SET amount_paid = 180 WHERE id = ?")
        .bind(inv.id)
        .execute(&db.pool)
        .await
        .unwrap();
    sqlx::query("UPDATE supplier SET credit = 0, balance_dirty = 1 WHERE id = ?")
        .bind(good.id)
        .execute(&db.pool)
        .await
        .unwrap();

    let report = ledger.reconcile_all_suppliers().await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].supplier_id, bad.id);
    assert_eq!(report.failures[0].code, ErrorCode::InvoiceMalformed);

    // the healthy supplier was still repaired
    let stored = ledger.get_supplier(good.id).await.unwrap();
    assert_money(stored.credit, 80.0);
    assert!(!stored.balance_dirty);
}

#[tokio::test]
async fn repair_runs_canonical_sequence() {
    let (db, ledger) = setup().await;
    let s = supplier(&ledger, "Acme").await;
    insert_raw_operation(&db, 1, s.id, "supplier_payment", "inflow", -1500.0, Some("INITIAL")).await;

    let report = ledger.repair().await.unwrap();
    assert_eq!(report.signs.touched, 1);
    assert_eq!(report.directions.touched, 1);
    assert_eq!(report.reconcile.processed, 1);
    assert_eq!(report.reconcile.changes.len(), 1);
    assert_money(report.reconcile.changes[0].new_debt, 1500.0);

    let again = ledger.repair().await.unwrap();
    assert_eq!(again.signs.touched, 0);
    assert_eq!(again.directions.touched, 0);
    assert!(again.reconcile.changes.is_empty());
}

#[tokio::test]
async fn reconcile_with_bounded_parallelism_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();
    let ledger = LedgerService::new(db.pool.clone()).with_reconcile_concurrency(3);

    let mut ids = Vec::new();
    for i in 0..12 {
        let s = supplier(&ledger, &format!("Supplier {i}")).await;
        advance(&ledger, s.id, 10.0 * (i + 1) as f64).await;
        ids.push(s.id);
    }
    sqlx::query("UPDATE supplier SET credit = 0, balance_dirty = 1")
        .execute(&db.pool)
        .await
        .unwrap();

    let report = ledger.reconcile_dirty().await.unwrap();
    assert_eq!(report.processed, 12);
    assert_eq!(report.changes.len(), 12);
    let mut sorted = report.changes.iter().map(|c| c.supplier_id).collect::<Vec<_>>();
    sorted.sort();
    assert_eq!(report.changes.iter().map(|c| c.supplier_id).collect::<Vec<_>>(), sorted);
    assert_eq!(ledger.preview().await.unwrap().dirty_suppliers, 0);
}
