//! Betting market groups: a set of complementary market legs sharing one
//! grading rule, optionally parameterized by a handicap pair or an
//! over/under line.

use crate::naming::render_description;
use crate::types::{
    Description, DynamicParams, Event, LocalEntity, Market, ObjectId, ObjectKind, Sport,
};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Authored market-leg template: the description before substitution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketTemplate {
    pub description: Description,
}

/// Authored market-group data before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketGroupSpec {
    pub description: Option<Description>,
    pub asset: Option<String>,
    pub bettingmarkets: Option<Vec<MarketTemplate>>,
    pub rules: Option<String>,
    pub number_betting_markets: Option<usize>,
    pub handicaps: Option<Vec<i64>>,
    pub overunder: Option<f64>,
    pub status: Option<String>,
    pub id: Option<ObjectId>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The eagerly materialized market legs of a group, together with the
/// declared count so callers can surface a mismatch without aborting.
#[derive(Debug, Clone)]
pub struct MarketExpansion {
    pub legs: Vec<Market>,
    pub declared: usize,
}

impl MarketExpansion {
    /// `Some((generated, declared))` when the expansion disagrees with the
    /// authored market count.
    pub fn count_mismatch(&self) -> Option<(usize, usize)> {
        if self.legs.len() != self.declared {
            Some((self.legs.len(), self.declared))
        } else {
            None
        }
    }
}

/// A betting market group under one event.
#[derive(Debug, Clone)]
pub struct MarketGroup {
    pub identifier: String,
    /// Authored description template, pre-substitution.
    template: Description,
    /// Rendered description including synthetic keys; refreshed whenever
    /// the dynamic parameterization changes.
    rendered: Description,
    pub asset: String,
    pub rules_name: String,
    market_templates: Vec<MarketTemplate>,
    pub declared_market_count: usize,
    pub dynamic: Option<DynamicParams>,
    pub status: Option<String>,
    pub event: Arc<Event>,
    pub id: Option<ObjectId>,
    pub extra: BTreeMap<String, Value>,
}

impl MarketGroup {
    pub fn new(spec: MarketGroupSpec, event: Arc<Event>) -> Result<Self> {
        let entity = format!("market group under {}", event.identifier);
        let template = spec.description.ok_or_else(|| Error::MissingMandatoryField {
            entity: entity.clone(),
            field: "description",
        })?;
        let asset = spec.asset.ok_or_else(|| Error::MissingMandatoryField {
            entity: entity.clone(),
            field: "asset",
        })?;
        let market_templates = spec
            .bettingmarkets
            .ok_or_else(|| Error::MissingMandatoryField {
                entity: entity.clone(),
                field: "bettingmarkets",
            })?;
        let rules_name = spec.rules.ok_or_else(|| Error::MissingMandatoryField {
            entity: entity.clone(),
            field: "rules",
        })?;

        if spec.handicaps.is_some() && spec.overunder.is_some() {
            return Err(Error::Config {
                message: format!("{entity} carries both handicaps and overunder"),
            });
        }
        let dynamic = match (spec.handicaps, spec.overunder) {
            (Some(pair), None) => Some(match pair.as_slice() {
                [home] => DynamicParams::handicap(Some(*home), None)?,
                [home, away] => DynamicParams::Handicap {
                    home: *home,
                    away: *away,
                },
                other => {
                    return Err(Error::Config {
                        message: format!(
                            "{entity} handicaps must have one or two sides, got {}",
                            other.len()
                        ),
                    })
                }
            }),
            (None, Some(line)) => Some(DynamicParams::over_under(line)),
            (None, None) => None,
            (Some(_), Some(_)) => unreachable!(),
        };

        let declared_market_count = spec
            .number_betting_markets
            .unwrap_or(market_templates.len());
        let identifier = format!(
            "{}/{}",
            event.name.get("en").unwrap_or_default(),
            template.get("en").unwrap_or_default()
        );
        let rendered = render_description(&template, &event.teams, dynamic.as_ref())?;

        Ok(Self {
            identifier,
            template,
            rendered,
            asset,
            rules_name,
            market_templates,
            declared_market_count,
            dynamic,
            status: spec.status,
            event,
            id: spec.id,
            extra: spec.extra,
        })
    }

    /// The sport this group belongs to, resolved through the parent event.
    pub fn sport(&self) -> &Sport {
        self.event.sport()
    }

    /// Replace the over/under line (normalized to a half-integer) and
    /// re-render the description.
    pub fn set_overunder(&mut self, line: f64) -> Result<()> {
        self.dynamic = Some(DynamicParams::over_under(line));
        self.refresh()
    }

    /// Replace the handicap pair (one side may be derived by negation) and
    /// re-render the description.
    pub fn set_handicaps(&mut self, home: Option<i64>, away: Option<i64>) -> Result<()> {
        self.dynamic = Some(DynamicParams::handicap(home, away)?);
        self.refresh()
    }

    fn refresh(&mut self) -> Result<()> {
        self.rendered = render_description(&self.template, &self.event.teams, self.dynamic.as_ref())?;
        Ok(())
    }

    /// Eagerly materialize the market legs in authoring order. The
    /// declared count travels with the result; a mismatch is a diagnostic
    /// for the caller, not an abort.
    pub fn expand_markets(&self) -> Result<MarketExpansion> {
        let mut legs = Vec::with_capacity(self.market_templates.len());
        for template in &self.market_templates {
            let description =
                render_description(&template.description, &self.event.teams, self.dynamic.as_ref())?;
            let identifier = format!(
                "{}/{}",
                self.identifier,
                description.get("en").unwrap_or_default()
            );
            legs.push(Market {
                identifier,
                description,
                group_id: self.id.clone(),
                id: None,
            });
        }
        Ok(MarketExpansion {
            legs,
            declared: self.declared_market_count,
        })
    }
}

impl LocalEntity for MarketGroup {
    fn kind(&self) -> ObjectKind {
        ObjectKind::MarketGroup
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn describe(&self) -> Description {
        self.rendered.clone()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn parent_id(&self) -> Option<&ObjectId> {
        self.event.id.as_ref()
    }

    fn parent(&self) -> Option<&dyn LocalEntity> {
        Some(self.event.as_ref())
    }

    fn parent_link_field(&self) -> Option<&'static str> {
        Some("event_id")
    }

    fn create_keys(&self) -> &'static [&'static str] {
        &["description", "event_id", "rules_id"]
    }

    fn update_keys(&self) -> &'static [&'static str] {
        &[
            "betting_market_group_id",
            "new_description",
            "new_event_id",
            "new_rules_id",
        ]
    }
}
