//! Supplier Model

use serde::{Deserialize, Serialize};

/// Supplier aggregate (供应商)
///
/// `debt` and `credit` are a cache owned by the balance engine. They are
/// always reproducible from the ledger and invoice tables and are never
/// written by CRUD paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: i64,
    pub agency_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub debt: f64,
    pub credit: f64,
    /// Set by every ledger/invoice write, cleared by recomputation
    pub balance_dirty: bool,
    pub balance_updated_at: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create supplier payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCreate {
    pub agency_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    /// Starting debt declared at onboarding, seeded as an INITIAL supplier_payment
    #[serde(default)]
    pub initial_debt: Option<f64>,
    /// Starting credit declared at onboarding, seeded as an INITIAL supplier_advance
    #[serde(default)]
    pub initial_credit: Option<f64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Update supplier payload (profile fields only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}
