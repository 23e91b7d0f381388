//! Sync Orchestrator
//!
//! Wires the reconciliation and grading engines to a real ledger: fetches
//! remote state over JSON-RPC, loads the authored sports catalog, and
//! plans one sync intent per entity. Intents are emitted for a downstream
//! broadcaster; nothing here signs or sends transactions.

pub mod catalog;
pub mod client;
pub mod intent;
pub mod runner;

pub use catalog::Catalog;
pub use client::{JsonRpcLedgerClient, LedgerClient};
pub use intent::{SyncDecision, SyncIntent};
pub use runner::SyncRunner;
