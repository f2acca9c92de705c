//! Unified Result Types
//!
//! `AppResult` (handlers, ledger logic) comes from `shared::error`; this adds
//! the top-level alias for the binaries.

/// Result type for the binaries' top level (startup, CLI)
pub type CliResult<T> = anyhow::Result<T>;
