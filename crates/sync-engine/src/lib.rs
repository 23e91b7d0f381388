//! Sync Engine
//!
//! Identity resolution between the local entity tree and remote ledger
//! records: pluggable comparator sets plus the reconciliation operations
//! (`find_id`, `is_synced`, `test_operation_equal`).

pub mod comparators;
pub mod engine;

pub use comparators::{Comparator, ComparatorSet};
pub use engine::{find_id, is_synced, resolution_equal, test_operation_equal, MatchContext};
