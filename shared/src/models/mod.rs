//! Data models
//!
//! Shared between ledger-server, the admin CLI and the back-office frontend
//! (via API). DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY, snowflake generated).
//! Money is carried as `f64` rounded to 2 decimal places; arithmetic happens
//! in `rust_decimal` on the server side.

pub mod invoice;
pub mod ledger;
pub mod operation;
pub mod payment;
pub mod supplier;

// Re-exports
pub use invoice::*;
pub use ledger::*;
pub use operation::*;
pub use payment::*;
pub use supplier::*;
