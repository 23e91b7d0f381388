//! Reconciliation entry points: operation equality, id lookup, and sync
//! checks over a snapshot of remote state.

use crate::comparators::{all_match, Comparator};
use bookie_core::types::{
    LocalEntity, ObjectId, ObjectKind, ObjectSnapshot, ProposalEnvelope, RemoteRecord,
};
use bookie_core::{Error, Result};
use tracing::trace;

/// Everything a comparison may consult besides the two records themselves.
/// The pending proposal is explicit context rather than ambient state so a
/// single entity can be checked against several proposals in one pass.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub snapshot: &'a ObjectSnapshot,
    pub proposal: Option<&'a ProposalEnvelope>,
}

impl<'a> MatchContext<'a> {
    pub fn new(snapshot: &'a ObjectSnapshot) -> Self {
        Self {
            snapshot,
            proposal: None,
        }
    }

    pub fn with_proposal(snapshot: &'a ObjectSnapshot, proposal: &'a ProposalEnvelope) -> Self {
        Self {
            snapshot,
            proposal: Some(proposal),
        }
    }
}

/// Does `remote` describe the same object as `local`, under the given
/// comparator conjunction?
///
/// Operations inside a pending proposal reference their parent by position
/// (`"0.0.n"`) instead of by assigned id. When the remote's parent link is
/// such a relative reference and a proposal is in context, the referenced
/// operation is dereferenced and checked against the local parent (with the
/// parent's own default set) before the conjunction runs; a parent that
/// does not match fails the whole comparison. An index past the end of the
/// proposal is a malformed remote, not a non-match.
pub fn test_operation_equal(
    local: &dyn LocalEntity,
    remote: &RemoteRecord,
    set: &[Comparator],
    ctx: &MatchContext<'_>,
) -> Result<bool> {
    if let (Some(field), Some(parent)) = (local.parent_link_field(), local.parent()) {
        if let Some(raw) = remote.str_or_new(field) {
            let reference = ObjectId::from(raw);
            if let (Some(index), Some(proposal)) = (reference.pending_op_index(), ctx.proposal) {
                let parent_op = proposal.operation(index).ok_or_else(|| {
                    Error::MalformedRemote(format!(
                        "operation references {raw} but the proposal has only {} operations",
                        proposal.len()
                    ))
                })?;
                if !test_operation_equal(parent, parent_op, &Comparator::default_equal_set(), ctx)?
                {
                    trace!(
                        entity = local.identifier(),
                        reference = raw,
                        "pending parent operation does not match"
                    );
                    return Ok(false);
                }
            }
        }
    }
    all_match(set, local, remote, ctx)
}

/// Scan `candidates` in order and return the ledger id of the first one the
/// conjunction accepts.
///
/// An entity whose parent has no resolvable ledger id cannot exist on the
/// ledger yet, so the scan is skipped and `Ok(None)` returned; unresolved
/// parents and empty candidate lists are expected states, never errors.
pub fn find_id(
    local: &dyn LocalEntity,
    candidates: &[&RemoteRecord],
    set: &[Comparator],
    ctx: &MatchContext<'_>,
) -> Result<Option<ObjectId>> {
    if let Some(parent_kind) = local.parent_kind() {
        let resolvable = local
            .parent_id()
            .map_or(false, |id| ctx.snapshot.valid_object_id(id, parent_kind));
        if !resolvable {
            trace!(
                entity = local.identifier(),
                "parent has no resolvable ledger id, skipping lookup"
            );
            return Ok(None);
        }
    }
    for candidate in candidates {
        if test_operation_equal(local, candidate, set, ctx)? {
            return Ok(candidate.id());
        }
    }
    Ok(None)
}

/// True when the entity's own ledger object exists in the snapshot and
/// still agrees with the local state under the default comparator set.
pub fn is_synced(local: &dyn LocalEntity, ctx: &MatchContext<'_>) -> Result<bool> {
    let Some(id) = local.id() else {
        return Ok(false);
    };
    match ctx.snapshot.get(id) {
        Some(record) => test_operation_equal(local, record, &Comparator::default_equal_set(), ctx),
        None => Ok(false),
    }
}

/// Does a resolve operation settle exactly the intended `[leg id, label]`
/// pairs for the intended group?
///
/// Pairs compare as an unordered set. The operation's group link follows
/// the usual unverifiable-pass policy: a group id the snapshot cannot
/// confirm does not disqualify the operation, a confirmed different group
/// does. A resolve operation without a `resolutions` key is malformed.
pub fn resolution_equal(
    local_resolutions: &[(ObjectId, String)],
    remote: &RemoteRecord,
    group_id: &ObjectId,
    ctx: &MatchContext<'_>,
) -> Result<bool> {
    let raw = remote.get("resolutions").ok_or_else(|| {
        Error::MalformedRemote("resolve operation has no resolutions".to_string())
    })?;
    let remote_pairs: Vec<(ObjectId, String)> = serde_json::from_value(raw.clone())
        .map_err(|e| Error::MalformedRemote(format!("unreadable resolutions: {e}")))?;

    if let Some(remote_group) = remote.str_or_new("betting_market_group_id").map(ObjectId::from) {
        let verifiable = ctx
            .snapshot
            .valid_object_id(&remote_group, ObjectKind::MarketGroup);
        if verifiable && &remote_group != group_id {
            return Ok(false);
        }
    }

    let covers = |outer: &[(ObjectId, String)], inner: &[(ObjectId, String)]| {
        inner.iter().all(|pair| outer.contains(pair))
    };
    Ok(covers(local_resolutions, &remote_pairs) && covers(&remote_pairs, local_resolutions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookie_core::types::{
        Description, Event, EventGroup, EventGroupSpec, EventSpec, MarketGroup, MarketGroupSpec,
        MarketTemplate, Sport, SportSpec,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn named(pairs: &[(&str, &str)]) -> Description {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn record(value: Value) -> RemoteRecord {
        RemoteRecord::from_value(value).unwrap()
    }

    fn test_event(with_ids: bool) -> Arc<Event> {
        let id = |s: &str| with_ids.then(|| ObjectId::from(s));
        let sport = Arc::new(
            Sport::new(SportSpec {
                identifier: Some("Basketball".to_string()),
                name: Some(named(&[("en", "Basketball")])),
                id: id("1.20.0"),
                ..Default::default()
            })
            .unwrap(),
        );
        let group = Arc::new(
            EventGroup::new(
                EventGroupSpec {
                    identifier: Some("NBA".to_string()),
                    name: Some(named(&[("en", "NBA")])),
                    id: id("1.21.12"),
                    ..Default::default()
                },
                sport,
            )
            .unwrap(),
        );
        Arc::new(
            Event::new(
                EventSpec {
                    teams: vec!["atlanta hawks".to_string(), "boston celtics".to_string()],
                    season: Some(named(&[("en", "2025-26")])),
                    start_time: Some(Utc.with_ymd_and_hms(2026, 3, 1, 19, 0, 0).unwrap()),
                    status: Some("upcoming".to_string()),
                    id: id("1.22.5"),
                    ..Default::default()
                },
                group,
            )
            .unwrap(),
        )
    }

    fn overunder_group(line: f64, event: Arc<Event>) -> MarketGroup {
        MarketGroup::new(
            MarketGroupSpec {
                description: Some(named(&[("en", "Over/Under {overunder} pts")])),
                asset: Some("BTS".to_string()),
                bettingmarkets: vec![
                    MarketTemplate {
                        description: named(&[("en", "Over {overunder}")]),
                    },
                    MarketTemplate {
                        description: named(&[("en", "Under {overunder}")]),
                    },
                ]
                .into(),
                rules: Some("R_NBA_OU".to_string()),
                overunder: Some(line),
                ..Default::default()
            },
            event,
        )
        .unwrap()
    }

    fn event_record() -> RemoteRecord {
        record(json!({
            "id": "1.22.5",
            "name": [["en", "Atlanta Hawks @ Boston Celtics"]],
            "season": [["en", "2025-26"]],
            "status": "upcoming",
            "event_group_id": "1.21.12"
        }))
    }

    fn snapshot() -> ObjectSnapshot {
        let mut snapshot = ObjectSnapshot::new();
        snapshot
            .insert(
                ObjectKind::Sport,
                record(json!({"id": "1.20.0", "name": [["en", "Basketball"]]})),
            )
            .unwrap();
        snapshot
            .insert(
                ObjectKind::EventGroup,
                record(json!({"id": "1.21.12", "name": [["en", "NBA"]], "sport_id": "1.20.0"})),
            )
            .unwrap();
        snapshot.insert(ObjectKind::Event, event_record()).unwrap();
        snapshot
    }

    fn ou_candidate(id: &str, line: &str) -> RemoteRecord {
        record(json!({
            "id": id,
            "description": [
                ["en", format!("Over/Under {line} pts")],
                ["_dynamic", "ou"],
                ["_ou", line]
            ],
            "event_id": "1.22.5",
            "rules_id": "1.23.3"
        }))
    }

    #[test]
    fn test_default_set_matches_committed_event() {
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);
        let event = test_event(true);
        let set = Comparator::default_equal_set();

        assert!(test_operation_equal(event.as_ref(), &event_record(), &set, &ctx).unwrap());

        let mut renamed = event_record();
        renamed.insert("name", json!([["en", "Someone Else @ Boston Celtics"]]));
        assert!(!test_operation_equal(event.as_ref(), &renamed, &set, &ctx).unwrap());

        let mut finished = event_record();
        finished.insert("status", json!("finished"));
        assert!(!test_operation_equal(event.as_ref(), &finished, &set, &ctx).unwrap());
    }

    #[test]
    fn test_shapeless_record_is_an_error() {
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);
        let event = test_event(true);
        let err = test_operation_equal(
            event.as_ref(),
            &record(json!({})),
            &Comparator::default_equal_set(),
            &ctx,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedRemote(_)));
    }

    #[test]
    fn test_unknown_parent_reference_passes() {
        // A parent id the snapshot cannot confirm is unverifiable and must
        // not disqualify an otherwise matching record.
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);
        let event = test_event(true);
        let mut moved = event_record();
        moved.insert("event_group_id", json!("1.21.99"));
        assert!(test_operation_equal(
            event.as_ref(),
            &moved,
            &Comparator::default_equal_set(),
            &ctx
        )
        .unwrap());

        // A confirmed different parent does.
        let mut snapshot = snapshot;
        snapshot
            .insert(
                ObjectKind::EventGroup,
                record(json!({"id": "1.21.99", "name": [["en", "WNBA"]], "sport_id": "1.20.0"})),
            )
            .unwrap();
        let ctx = MatchContext::new(&snapshot);
        assert!(!test_operation_equal(
            event.as_ref(),
            &moved,
            &Comparator::default_equal_set(),
            &ctx
        )
        .unwrap());
    }

    #[test]
    fn test_pending_parent_is_dereferenced_through_the_proposal() {
        let snapshot = snapshot();
        let event = test_event(true);
        let group = overunder_group(3.5, Arc::clone(&event));
        let group_op = record(json!({
            "description": group.describe(),
            "event_id": "0.0.0",
            "rules_id": "1.23.3"
        }));

        let matching: ProposalEnvelope = serde_json::from_value(json!({
            "id": "1.10.336",
            "proposed_transaction": {"operations": [[56, {
                "name": [["en", "Atlanta Hawks @ Boston Celtics"]],
                "season": [["en", "2025-26"]],
                "status": "upcoming",
                "event_group_id": "1.21.12"
            }]]}
        }))
        .unwrap();
        let ctx = MatchContext::with_proposal(&snapshot, &matching);
        assert!(test_operation_equal(&group, &group_op, &Comparator::default_equal_set(), &ctx)
            .unwrap());

        // Same group operation, but the proposal creates some other event.
        let other: ProposalEnvelope = serde_json::from_value(json!({
            "id": "1.10.336",
            "proposed_transaction": {"operations": [[56, {
                "name": [["en", "Chicago Bulls @ Boston Celtics"]],
                "season": [["en", "2025-26"]],
                "status": "upcoming",
                "event_group_id": "1.21.12"
            }]]}
        }))
        .unwrap();
        let ctx = MatchContext::with_proposal(&snapshot, &other);
        assert!(!test_operation_equal(&group, &group_op, &Comparator::default_equal_set(), &ctx)
            .unwrap());
    }

    #[test]
    fn test_pending_parent_index_out_of_range() {
        let snapshot = snapshot();
        let proposal: ProposalEnvelope = serde_json::from_value(json!({
            "id": "1.10.336",
            "proposed_transaction": {"operations": [[56, {"name": [["en", "x"]]}]]}
        }))
        .unwrap();
        let ctx = MatchContext::with_proposal(&snapshot, &proposal);
        let event = test_event(true);
        let group = overunder_group(3.5, event);
        let group_op = record(json!({
            "description": group.describe(),
            "event_id": "0.0.7",
            "rules_id": "1.23.3"
        }));
        let err =
            test_operation_equal(&group, &group_op, &Comparator::default_equal_set(), &ctx)
                .unwrap_err();
        assert!(matches!(err, Error::MalformedRemote(_)));
    }

    #[test]
    fn test_find_id_returns_first_match() {
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);
        let event = test_event(true);
        let group = overunder_group(3.5, event);
        let candidates = [ou_candidate("1.24.1", "2.5"), ou_candidate("1.24.2", "3.5")];
        let refs: Vec<&RemoteRecord> = candidates.iter().collect();

        let found = find_id(&group, &refs, &Comparator::default_find_set(), &ctx).unwrap();
        assert_eq!(found, Some(ObjectId::from("1.24.2")));
    }

    #[test]
    fn test_find_id_with_no_candidates() {
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);
        let group = overunder_group(3.5, test_event(true));
        assert_eq!(
            find_id(&group, &[], &Comparator::default_find_set(), &ctx).unwrap(),
            None
        );
    }

    #[test]
    fn test_find_id_without_resolvable_parent() {
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);
        // The whole chain is idless, so the group's parent event cannot be
        // resolved on the ledger.
        let group = overunder_group(3.5, test_event(false));
        let candidates = [ou_candidate("1.24.2", "3.5")];
        let refs: Vec<&RemoteRecord> = candidates.iter().collect();
        assert_eq!(
            find_id(&group, &refs, &Comparator::default_find_set(), &ctx).unwrap(),
            None
        );
    }

    #[test]
    fn test_find_id_with_fuzzy_line_lookup() {
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);
        let event = test_event(true);
        let candidates = [ou_candidate("1.24.1", "3.5"), ou_candidate("1.24.2", "5.0")];
        let refs: Vec<&RemoteRecord> = candidates.iter().collect();

        // 4.9 normalizes to 4.5: no candidate sits exactly there.
        let group = overunder_group(4.9, Arc::clone(&event));
        let exact = vec![Comparator::DynamicFuzzy { spread: 0.0 }];
        assert_eq!(find_id(&group, &refs, &exact, &ctx).unwrap(), None);

        // 5.0 normalizes to 5.5: exact lookup misses, a half-point of slack
        // reaches the 5.0 candidate.
        let group = overunder_group(5.0, event);
        assert_eq!(find_id(&group, &refs, &exact, &ctx).unwrap(), None);
        let slack = vec![Comparator::DynamicFuzzy { spread: 0.51 }];
        assert_eq!(
            find_id(&group, &refs, &slack, &ctx).unwrap(),
            Some(ObjectId::from("1.24.2"))
        );
    }

    #[test]
    fn test_is_synced_requires_known_matching_record() {
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);

        assert!(is_synced(test_event(true).as_ref(), &ctx).unwrap());
        assert!(!is_synced(test_event(false).as_ref(), &ctx).unwrap());

        let mut drifted = snapshot.clone();
        let mut renamed = event_record();
        renamed.insert("name", json!([["en", "Someone Else @ Boston Celtics"]]));
        drifted.insert(ObjectKind::Event, renamed).unwrap();
        let ctx = MatchContext::new(&drifted);
        assert!(!is_synced(test_event(true).as_ref(), &ctx).unwrap());
    }

    #[test]
    fn test_resolution_equality_is_order_free() {
        let mut snapshot = snapshot();
        snapshot
            .insert(
                ObjectKind::MarketGroup,
                record(json!({"id": "1.24.2", "description": [["en", "Moneyline"]]})),
            )
            .unwrap();
        let ctx = MatchContext::new(&snapshot);
        let group_id = ObjectId::from("1.24.2");
        let local = vec![
            (ObjectId::from("1.25.10"), "win".to_string()),
            (ObjectId::from("1.25.11"), "not_win".to_string()),
        ];

        let resolve = record(json!({
            "betting_market_group_id": "1.24.2",
            "resolutions": [["1.25.11", "not_win"], ["1.25.10", "win"]]
        }));
        assert!(resolution_equal(&local, &resolve, &group_id, &ctx).unwrap());

        let partial = record(json!({
            "betting_market_group_id": "1.24.2",
            "resolutions": [["1.25.10", "win"]]
        }));
        assert!(!resolution_equal(&local, &partial, &group_id, &ctx).unwrap());

        // Unconfirmable group link passes, a confirmed different one fails.
        let elsewhere = record(json!({
            "betting_market_group_id": "1.24.99",
            "resolutions": [["1.25.11", "not_win"], ["1.25.10", "win"]]
        }));
        assert!(resolution_equal(&local, &elsewhere, &group_id, &ctx).unwrap());
        snapshot
            .insert(
                ObjectKind::MarketGroup,
                record(json!({"id": "1.24.99", "description": [["en", "Other"]]})),
            )
            .unwrap();
        let ctx = MatchContext::new(&snapshot);
        assert!(!resolution_equal(&local, &elsewhere, &group_id, &ctx).unwrap());
    }

    #[test]
    fn test_resolve_without_resolutions_is_malformed() {
        let snapshot = snapshot();
        let ctx = MatchContext::new(&snapshot);
        let err = resolution_equal(
            &[],
            &record(json!({"betting_market_group_id": "1.24.2"})),
            &ObjectId::from("1.24.2"),
            &ctx,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedRemote(_)));
    }
}
