//! Sync intents: what the planner wants done for one entity.

use bookie_core::types::ObjectId;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncDecision {
    /// No remote counterpart exists; propose a create operation.
    ProposeCreate,
    /// A remote counterpart exists under `object` but has drifted.
    ProposeUpdate { object: ObjectId },
    /// Settle the group's markets with these outcomes.
    ProposeResolve {
        group: ObjectId,
        resolutions: Vec<(ObjectId, String)>,
    },
    /// An equivalent operation already sits in a pending proposal;
    /// proposing again would duplicate it.
    Pending { proposal: Option<ObjectId> },
    /// The remote object exists and agrees with the local state.
    InSync { object: ObjectId },
    /// The parent has no ledger id yet; retry after the parent lands.
    AwaitingParent,
}

/// One planning outcome, tagged for correlation across log lines and the
/// downstream broadcaster.
#[derive(Debug, Clone, Serialize)]
pub struct SyncIntent {
    pub id: Uuid,
    /// Identifier of the local entity this decision is about.
    pub entity: String,
    pub decision: SyncDecision,
}

impl SyncIntent {
    pub fn new(entity: impl Into<String>, decision: SyncDecision) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity: entity.into(),
            decision,
        }
    }

    /// Whether this intent asks for a new proposal on the ledger.
    pub fn requires_proposal(&self) -> bool {
        matches!(
            self.decision,
            SyncDecision::ProposeCreate
                | SyncDecision::ProposeUpdate { .. }
                | SyncDecision::ProposeResolve { .. }
        )
    }
}
