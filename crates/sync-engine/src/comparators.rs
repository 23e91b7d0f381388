//! Identity comparators.
//!
//! Each comparator is a pure predicate over a `(local entity, remote
//! record)` pair; a comparator set is evaluated by logical AND. Comparators
//! are value types carrying their parameters (spread, key filters) so sets
//! can be serialized, logged, and tested without closures.

use crate::engine::MatchContext;
use bookie_core::types::{
    Description, LocalEntity, ObjectId, RemoteRecord, KEY_HANDICAP_AWAY, KEY_HANDICAP_HOME,
    KEY_OVER_UNDER,
};
use bookie_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// An ordered conjunction of comparators.
pub type ComparatorSet = Vec<Comparator>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparator {
    /// The remote record must carry either the create-shaped or the
    /// update-shaped key set for the local's kind. A record matching
    /// neither is a configuration defect, not a non-match.
    RequiredKeys,
    /// Vacuously true when the local entity has no status; otherwise the
    /// remote status must equal it.
    Status,
    /// The remote's parent-link field must equal the local's resolved
    /// parent id. A parent id that does not resolve to a known object of
    /// the expected kind is unverifiable and passes; this deliberately
    /// tolerates proposals referencing not-yet-committed parents.
    ParentLink,
    /// Both descriptions non-empty and set-equal as unordered pairs.
    AllDescription,
    /// Set-equality restricted to the listed description keys.
    Descriptions { keys: Vec<String> },
    /// Set-equality restricted to plain languages (keys not starting with
    /// an underscore), ignoring the synthetic `_dynamic` keys.
    PlainLangs,
    /// For dynamic groups: ignore the literal text and compare the
    /// `_dynamic` discriminator plus numeric closeness of the parameters
    /// within `[center - spread, center + spread]` (inclusive).
    DynamicFuzzy { spread: f64 },
    /// The remote description contains the exact `(lang, text)` pair of
    /// the local description for one specific language.
    SingleLang { lang: String },
}

impl Comparator {
    /// The default conjunction for full operation equality.
    pub fn default_equal_set() -> ComparatorSet {
        vec![
            Comparator::RequiredKeys,
            Comparator::Status,
            Comparator::ParentLink,
            Comparator::AllDescription,
        ]
    }

    /// The default set for id lookup: English content only.
    pub fn default_find_set() -> ComparatorSet {
        vec![Comparator::SingleLang {
            lang: "en".to_string(),
        }]
    }

    pub fn matches(
        &self,
        local: &dyn LocalEntity,
        remote: &RemoteRecord,
        ctx: &MatchContext<'_>,
    ) -> Result<bool> {
        match self {
            Comparator::RequiredKeys => {
                let update = remote.contains_any(local.update_keys());
                let create = remote.contains_any(local.create_keys());
                if !update && !create {
                    return Err(Error::MalformedRemote(format!(
                        "record compared against {} is neither create- nor update-shaped",
                        local.identifier()
                    )));
                }
                Ok(true)
            }
            Comparator::Status => Ok(match local.status() {
                None => true,
                Some(status) => remote.status() == Some(status),
            }),
            Comparator::ParentLink => {
                let Some(field) = local.parent_link_field() else {
                    return Ok(true);
                };
                let Some(remote_parent) = remote.str_or_new(field).map(ObjectId::from) else {
                    return Ok(true);
                };
                let verifiable = local
                    .parent_kind()
                    .map_or(false, |kind| ctx.snapshot.valid_object_id(&remote_parent, kind));
                if !verifiable {
                    return Ok(true);
                }
                Ok(local.parent_id() == Some(&remote_parent))
            }
            Comparator::AllDescription => {
                Ok(description_set_eq(local, remote, |_| true))
            }
            Comparator::Descriptions { keys } => {
                Ok(description_set_eq(local, remote, |k| {
                    keys.iter().any(|key| key == k)
                }))
            }
            Comparator::PlainLangs => {
                Ok(description_set_eq(local, remote, |k| !k.starts_with('_')))
            }
            Comparator::DynamicFuzzy { spread } => fuzzy_dynamic_match(local, remote, *spread),
            Comparator::SingleLang { lang } => {
                let local_descr = local.describe();
                let Some(text) = local_descr.get(lang) else {
                    return Ok(false);
                };
                Ok(remote
                    .description_at(local.description_field())
                    .map_or(false, |d| d.contains_pair(lang, text)))
            }
        }
    }
}

/// Evaluate a whole set as a conjunction. Order is insignificant to the
/// outcome: every comparator is pure and total over well-formed input.
pub fn all_match(
    set: &[Comparator],
    local: &dyn LocalEntity,
    remote: &RemoteRecord,
    ctx: &MatchContext<'_>,
) -> Result<bool> {
    for comparator in set {
        if !comparator.matches(local, remote, ctx)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn description_set_eq(
    local: &dyn LocalEntity,
    remote: &RemoteRecord,
    keep: impl Fn(&str) -> bool,
) -> bool {
    let local_descr = local.describe().filtered(&keep);
    let remote_descr = remote
        .description_at(local.description_field())
        .map(|d| d.filtered(&keep));
    match remote_descr {
        Some(remote_descr) if !remote_descr.is_empty() && !local_descr.is_empty() => {
            remote_descr.set_eq(&local_descr)
        }
        _ => false,
    }
}

fn parse_param(descr: &Description, key: &str, who: &str) -> Result<f64> {
    let raw = descr.get(key).ok_or_else(|| {
        Error::MalformedRemote(format!("dynamic {who} description is missing {key}"))
    })?;
    raw.parse::<f64>().map_err(|_| {
        Error::MalformedRemote(format!("dynamic {who} description has non-numeric {key}: '{raw}'"))
    })
}

fn in_range(x: f64, center: f64, spread: f64) -> bool {
    x >= center - spread && x <= center + spread
}

fn fuzzy_dynamic_match(
    local: &dyn LocalEntity,
    remote: &RemoteRecord,
    spread: f64,
) -> Result<bool> {
    let local_descr = local.describe();
    let Some(remote_descr) = remote.description_at(local.description_field()) else {
        return Ok(false);
    };
    let (Some(local_kind), Some(remote_kind)) =
        (local_descr.dynamic_kind(), remote_descr.dynamic_kind())
    else {
        return Ok(false);
    };
    // Mismatched discriminators never match, regardless of spread.
    if !local_kind.eq_ignore_ascii_case(remote_kind) {
        return Ok(false);
    }

    match local_kind.to_ascii_lowercase().as_str() {
        "hc" => {
            let center_home = parse_param(&local_descr, KEY_HANDICAP_HOME, "local")?;
            let center_away = parse_param(&local_descr, KEY_HANDICAP_AWAY, "local")?;
            let remote_home = parse_param(&remote_descr, KEY_HANDICAP_HOME, "remote")?;
            let remote_away = parse_param(&remote_descr, KEY_HANDICAP_AWAY, "remote")?;
            Ok(in_range(remote_home, center_home, spread)
                && in_range(remote_away, center_away, spread))
        }
        "ou" => {
            let center = parse_param(&local_descr, KEY_OVER_UNDER, "local")?;
            let remote_line = parse_param(&remote_descr, KEY_OVER_UNDER, "remote")?;
            Ok(in_range(remote_line, center, spread))
        }
        other => Err(Error::MalformedRemote(format!(
            "unknown dynamic discriminator '{other}' on {}",
            local.identifier()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookie_core::types::{
        Event, EventGroup, EventGroupSpec, EventSpec, MarketGroup, MarketGroupSpec, MarketTemplate,
        ObjectSnapshot, Sport, SportSpec,
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

    fn test_event() -> Arc<Event> {
        let sport = Arc::new(
            Sport::new(SportSpec {
                identifier: Some("Basketball".to_string()),
                name: Some(named(&[("en", "Basketball")])),
                ..Default::default()
            })
            .unwrap(),
        );
        let group = Arc::new(
            EventGroup::new(
                EventGroupSpec {
                    identifier: Some("NBA".to_string()),
                    name: Some(named(&[("en", "NBA")])),
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
                    start_time: Some(Utc.with_ymd_and_hms(2026, 3, 1, 19, 0, 0).unwrap()),
                    ..Default::default()
                },
                group,
            )
            .unwrap(),
        )
    }

    fn handicap_group(home: i64) -> MarketGroup {
        MarketGroup::new(
            MarketGroupSpec {
                description: Some(named(&[
                    ("en", "Handicap {handicaps.home}"),
                    ("display_name", "Handicap {handicaps.home}"),
                ])),
                asset: Some("BTS".to_string()),
                bettingmarkets: vec![MarketTemplate {
                    description: named(&[("en", "{teams.home} ({handicaps.home})")]),
                }]
                .into(),
                rules: Some("R_NBA_HC".to_string()),
                handicaps: Some(vec![home]),
                ..Default::default()
            },
            test_event(),
        )
        .unwrap()
    }

    fn check(comparator: &Comparator, local: &dyn LocalEntity, remote: &RemoteRecord) -> Result<bool> {
        let snapshot = ObjectSnapshot::new();
        let ctx = MatchContext::new(&snapshot);
        comparator.matches(local, remote, &ctx)
    }

    #[test]
    fn test_status_is_vacuous_without_local_status() {
        let event = test_event();
        assert!(check(
            &Comparator::Status,
            event.as_ref(),
            &record(json!({"status": "anything"}))
        )
        .unwrap());
    }

    #[test]
    fn test_fuzzy_handicap_negates_one_sided_pair() {
        // handicaps [3] means home +3, away -3.
        let group = handicap_group(3);
        let near = record(json!({
            "description": [["_dynamic", "hc"], ["_hch", "4"], ["_hca", "-4"]]
        }));
        assert!(!check(&Comparator::DynamicFuzzy { spread: 0.5 }, &group, &near).unwrap());
        assert!(check(&Comparator::DynamicFuzzy { spread: 1.0 }, &group, &near).unwrap());
    }

    #[test]
    fn test_fuzzy_ignores_mismatched_discriminators() {
        let group = handicap_group(3);
        let over_under = record(json!({
            "description": [["_dynamic", "ou"], ["_ou", "3.0"]]
        }));
        assert!(!check(&Comparator::DynamicFuzzy { spread: 100.0 }, &group, &over_under).unwrap());
        assert!(!check(
            &Comparator::DynamicFuzzy { spread: 100.0 },
            &group,
            &record(json!({"description": [["en", "static text"]]}))
        )
        .unwrap());
    }

    #[test]
    fn test_fuzzy_rejects_incomplete_dynamic_record() {
        let group = handicap_group(3);
        let err = check(
            &Comparator::DynamicFuzzy { spread: 1.0 },
            &group,
            &record(json!({"description": [["_dynamic", "hc"], ["_hch", "4"]]})),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedRemote(_)));
    }

    #[test]
    fn test_plain_langs_skips_synthetic_keys() {
        let group = handicap_group(3);
        let mut mangled_pairs: Vec<(String, String)> = group
            .describe()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (key, value) in &mut mangled_pairs {
            if key == "_dynamic" {
                *value = "FAKE".to_string();
            }
        }
        let remote = record(json!({"description": json!(mangled_pairs
            .iter()
            .map(|(k, v)| json!([k, v]))
            .collect::<Vec<_>>())}));

        assert!(!check(&Comparator::AllDescription, &group, &remote).unwrap());
        assert!(check(&Comparator::PlainLangs, &group, &remote).unwrap());
        assert!(check(
            &Comparator::Descriptions {
                keys: vec!["en".to_string(), "display_name".to_string()],
            },
            &group,
            &remote
        )
        .unwrap());
    }

    #[test]
    fn test_single_lang_checks_one_exact_pair() {
        let event = test_event();
        let exact = record(json!({
            "name": [["en", "Atlanta Hawks @ Boston Celtics"], ["de", "anything"]]
        }));
        let comparator = Comparator::SingleLang {
            lang: "en".to_string(),
        };
        assert!(check(&comparator, event.as_ref(), &exact).unwrap());
        assert!(!check(
            &comparator,
            event.as_ref(),
            &record(json!({"name": [["en", "Chicago Bulls @ Boston Celtics"]]}))
        )
        .unwrap());
    }

    #[test]
    fn test_comparator_sets_round_trip_through_serde() {
        let set = vec![
            Comparator::RequiredKeys,
            Comparator::DynamicFuzzy { spread: 0.51 },
            Comparator::SingleLang {
                lang: "en".to_string(),
            },
        ];
        let encoded = serde_json::to_value(&set).unwrap();
        assert_eq!(encoded[1], json!({"kind": "dynamic_fuzzy", "spread": 0.51}));
        let decoded: ComparatorSet = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, set);
    }
}
