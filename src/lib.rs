//! Bookie Sync: ledger reconciliation and grading for sports betting markets.
//!
//! This is the root crate that provides benchmark and integration-test
//! access to the internal modules. For actual functionality, use the
//! individual crates directly:
//!
//! - `bookie-core`: Entity tree, canonical naming, remote records, config
//! - `sync-engine`: Identity comparators and reconciliation
//! - `grading-engine`: Grading formulas and market resolution
//! - `sync-orchestrator`: Ledger client and the planning loop

// Re-export for benchmarks
pub use bookie_core as core;
pub use grading_engine as grading;
pub use sync_engine as sync;
pub use sync_orchestrator as orchestrator;
