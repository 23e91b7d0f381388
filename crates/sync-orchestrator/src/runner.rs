//! The planning pass: one sync decision per entity, against a fixed
//! snapshot of remote state.

use crate::intent::{SyncDecision, SyncIntent};
use bookie_core::types::{
    GradingSpec, LocalEntity, MarketGroup, MatchResult, ObjectId, ObjectKind, ObjectSnapshot,
    ProposalEnvelope,
};
use bookie_core::Result;
use grading_engine::GradingContext;
use sync_engine::engine::{find_id, is_synced, resolution_equal, test_operation_equal, MatchContext};
use sync_engine::Comparator;
use tracing::{debug, error, info};

pub struct SyncRunner<'a> {
    snapshot: &'a ObjectSnapshot,
    proposals: &'a [ProposalEnvelope],
}

impl<'a> SyncRunner<'a> {
    pub fn new(snapshot: &'a ObjectSnapshot, proposals: &'a [ProposalEnvelope]) -> Self {
        Self {
            snapshot,
            proposals,
        }
    }

    /// Decide what, if anything, the ledger needs for one entity.
    ///
    /// Checked in order: already in sync, already sitting in a pending
    /// proposal, present but drifted, parent not yet on the ledger, and
    /// otherwise absent.
    pub fn plan_entity(&self, local: &dyn LocalEntity) -> Result<SyncIntent> {
        let ctx = MatchContext::new(self.snapshot);

        if let Some(object) = local.id().cloned() {
            if is_synced(local, &ctx)? {
                debug!(entity = local.identifier(), object = %object, "in sync");
                return Ok(SyncIntent::new(
                    local.identifier(),
                    SyncDecision::InSync { object },
                ));
            }
        }

        for proposal in self.proposals {
            let ctx = MatchContext::with_proposal(self.snapshot, proposal);
            for record in proposal.operations() {
                // Only consider operations shaped for this entity's kind;
                // foreign shapes are expected here, not malformed input.
                if !record.contains_any(local.create_keys())
                    && !record.contains_any(local.update_keys())
                {
                    continue;
                }
                if test_operation_equal(local, record, &Comparator::default_equal_set(), &ctx)? {
                    debug!(entity = local.identifier(), "already pending");
                    return Ok(SyncIntent::new(
                        local.identifier(),
                        SyncDecision::Pending {
                            proposal: proposal.id.clone(),
                        },
                    ));
                }
            }
        }

        let candidates = self.snapshot.of_kind(local.kind());
        if let Some(object) =
            find_id(local, &candidates, &Comparator::default_find_set(), &ctx)?
        {
            info!(entity = local.identifier(), object = %object, "drifted, will update");
            return Ok(SyncIntent::new(
                local.identifier(),
                SyncDecision::ProposeUpdate { object },
            ));
        }

        if let Some(parent_kind) = local.parent_kind() {
            let resolvable = local
                .parent_id()
                .map_or(false, |id| self.snapshot.valid_object_id(id, parent_kind));
            if !resolvable {
                debug!(entity = local.identifier(), "parent not on the ledger yet");
                return Ok(SyncIntent::new(
                    local.identifier(),
                    SyncDecision::AwaitingParent,
                ));
            }
        }

        info!(entity = local.identifier(), "absent, will create");
        Ok(SyncIntent::new(
            local.identifier(),
            SyncDecision::ProposeCreate,
        ))
    }

    /// Plan a market group. Expands its legs first so a divergence between
    /// the generated markets and the authored count is surfaced even when
    /// the group itself needs no ledger action.
    pub fn plan_market_group(&self, group: &MarketGroup) -> Result<SyncIntent> {
        let expansion = group.expand_markets()?;
        if let Some((generated, declared)) = expansion.count_mismatch() {
            error!(
                group = group.identifier(),
                generated, declared, "market count diverges from the authored count"
            );
        }
        self.plan_entity(group)
    }

    /// Plan the settlement of a graded market group.
    ///
    /// The group's committed market legs are read from the snapshot in
    /// instance order, graded, and checked against pending resolve
    /// operations so an already-proposed settlement is not proposed twice.
    pub fn plan_resolution(
        &self,
        group: &MarketGroup,
        grading: &GradingSpec,
        result: MatchResult,
    ) -> Result<SyncIntent> {
        let Some(group_id) = group.id().cloned() else {
            debug!(group = group.identifier(), "group not on the ledger yet");
            return Ok(SyncIntent::new(
                group.identifier(),
                SyncDecision::AwaitingParent,
            ));
        };

        let mut legs: Vec<ObjectId> = self
            .snapshot
            .of_kind(ObjectKind::Market)
            .into_iter()
            .filter(|record| {
                record.str_or_new("group_id").map(ObjectId::from).as_ref() == Some(&group_id)
            })
            .filter_map(|record| record.id())
            .collect();
        legs.sort_by_key(|id| id.instance());

        let ctx = GradingContext {
            result,
            teams: group.event.teams.clone(),
            dynamic: group.dynamic,
        };
        let resolutions = grading_engine::resolve(grading, &ctx, &legs)?;

        let match_ctx = MatchContext::new(self.snapshot);
        for proposal in self.proposals {
            for record in proposal.operations() {
                if record.get("resolutions").is_none() {
                    continue;
                }
                if resolution_equal(&resolutions, record, &group_id, &match_ctx)? {
                    debug!(group = group.identifier(), "settlement already pending");
                    return Ok(SyncIntent::new(
                        group.identifier(),
                        SyncDecision::Pending {
                            proposal: proposal.id.clone(),
                        },
                    ));
                }
            }
        }

        Ok(SyncIntent::new(
            group.identifier(),
            SyncDecision::ProposeResolve {
                group: group_id,
                resolutions,
            },
        ))
    }
}
