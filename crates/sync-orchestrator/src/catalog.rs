//! The authored sports catalog: nested definition documents parsed into
//! the validated entity tree the planner walks.

use bookie_core::types::{
    Event, EventGroup, EventGroupSpec, EventSpec, MarketGroup, MarketGroupSpec, Rule, RuleSpec,
    Sport, SportSpec,
};
use bookie_core::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct SportDoc {
    #[serde(flatten)]
    pub sport: SportSpec,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub eventgroups: Vec<EventGroupDoc>,
}

#[derive(Debug, Deserialize)]
pub struct EventGroupDoc {
    #[serde(flatten)]
    pub group: EventGroupSpec,
    #[serde(default)]
    pub events: Vec<EventDoc>,
}

#[derive(Debug, Deserialize)]
pub struct EventDoc {
    #[serde(flatten)]
    pub event: EventSpec,
    #[serde(default)]
    pub bettingmarketgroups: Vec<MarketGroupSpec>,
}

/// The flattened, validated entity tree.
#[derive(Debug, Default)]
pub struct Catalog {
    pub sports: Vec<Arc<Sport>>,
    pub rules: Vec<Rule>,
    pub event_groups: Vec<Arc<EventGroup>>,
    pub events: Vec<Arc<Event>>,
    pub market_groups: Vec<MarketGroup>,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(&path).map_err(|e| Error::Config {
            message: format!(
                "cannot read sports catalog {}: {e}",
                path.as_ref().display()
            ),
        })?;
        let docs: Vec<SportDoc> = serde_json::from_str(&raw)?;
        Self::build(docs)
    }

    /// Validate the documents bottom-up into linked entities. The first
    /// authoring defect aborts the whole load; a partially-built catalog
    /// must never reach the planner.
    pub fn build(docs: Vec<SportDoc>) -> Result<Self> {
        let mut catalog = Catalog::default();
        for doc in docs {
            let mut sport_spec = doc.sport;
            sport_spec.rules = doc
                .rules
                .iter()
                .filter_map(|rule| rule.name.as_ref().and_then(|n| n.get("en")))
                .map(str::to_string)
                .collect();
            let sport = Arc::new(Sport::new(sport_spec)?);

            for rule_spec in doc.rules {
                catalog.rules.push(Rule::new(rule_spec, Arc::clone(&sport))?);
            }
            for group_doc in doc.eventgroups {
                let group = Arc::new(EventGroup::new(group_doc.group, Arc::clone(&sport))?);
                for event_doc in group_doc.events {
                    let event = Arc::new(Event::new(event_doc.event, Arc::clone(&group))?);
                    for market_group_spec in event_doc.bettingmarketgroups {
                        catalog
                            .market_groups
                            .push(MarketGroup::new(market_group_spec, Arc::clone(&event))?);
                    }
                    catalog.events.push(event);
                }
                catalog.event_groups.push(group);
            }
            catalog.sports.push(sport);
        }
        debug!(
            sports = catalog.sports.len(),
            rules = catalog.rules.len(),
            market_groups = catalog.market_groups.len(),
            "catalog built"
        );
        Ok(catalog)
    }

    /// The grading rule a market group names, if the catalog carries it.
    pub fn rule_for(&self, group: &MarketGroup) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|rule| rule.name.get("en") == Some(group.rules_name.as_str()))
    }
}
