//! Grading rules and match results.

use crate::types::{Description, LocalEntity, ObjectId, ObjectKind, Sport};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One outcome group: outcome label mapped to a boolean expression
/// template over `{metric}` (and the line/handicap context).
pub type OutcomeGroup = BTreeMap<String, String>;

/// The operator-authored grading formula carried in a rule's `grading`
/// description entry. Wire shape:
///
/// ```json
/// {"metric": "{result.hometeam} - {result.awayteam}",
///  "resolutions": [{"win": "{metric} > 0", "not_win": "{metric} <= 0", "void": "False"}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingSpec {
    pub metric: String,
    #[serde(default)]
    pub resolutions: Vec<OutcomeGroup>,
}

impl GradingSpec {
    /// Parse the grading payload. A payload that does not match the wire
    /// shape (including a non-string metric) is a rule-authoring defect.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| Error::MalformedRule(format!("bad grading payload: {e}")))
    }
}

/// A raw two-sided match result; index 0 is the home team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    home: f64,
    away: f64,
}

impl MatchResult {
    /// Validate the result shape: anything but exactly two values is an
    /// input defect, distinct from rule-authoring defects.
    pub fn new(values: &[f64]) -> Result<Self> {
        match values {
            [home, away] => Ok(Self {
                home: *home,
                away: *away,
            }),
            other => Err(Error::InvalidResult(format!(
                "result must have exactly two elements, got {}",
                other.len()
            ))),
        }
    }

    pub fn home(&self) -> f64 {
        self.home
    }

    pub fn away(&self) -> f64 {
        self.away
    }

    pub fn total(&self) -> f64 {
        self.home + self.away
    }
}

/// Authored rule data before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSpec {
    pub name: Option<Description>,
    pub description: Option<Description>,
    /// Explicit grading formula; when absent, the `grading` entry of the
    /// description is parsed instead.
    pub grading: Option<GradingSpec>,
    pub id: Option<ObjectId>,
}

/// A grading rule owned by a sport.
#[derive(Debug, Clone)]
pub struct Rule {
    pub identifier: String,
    pub name: Description,
    pub description: Description,
    pub grading: GradingSpec,
    pub sport: Arc<Sport>,
    pub id: Option<ObjectId>,
}

impl Rule {
    pub fn new(spec: RuleSpec, sport: Arc<Sport>) -> Result<Self> {
        let name = spec.name.ok_or_else(|| Error::MissingMandatoryField {
            entity: format!("rule under {}", sport.identifier),
            field: "name",
        })?;
        let description = spec
            .description
            .ok_or_else(|| Error::MissingMandatoryField {
                entity: format!("rule under {}", sport.identifier),
                field: "description",
            })?;
        let identifier = format!(
            "{}/{}",
            sport.identifier,
            name.get("en").unwrap_or_default()
        );
        let grading = match spec.grading {
            Some(grading) => grading,
            None => {
                let raw = description
                    .get("grading")
                    .ok_or_else(|| Error::MissingMandatoryField {
                        entity: identifier.clone(),
                        field: "grading",
                    })?;
                GradingSpec::from_json(raw)?
            }
        };
        Ok(Self {
            identifier,
            name,
            description,
            grading,
            sport,
            id: spec.id,
        })
    }
}

impl LocalEntity for Rule {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Rule
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn describe(&self) -> Description {
        self.description.clone()
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn create_keys(&self) -> &'static [&'static str] {
        &["name", "description"]
    }

    fn update_keys(&self) -> &'static [&'static str] {
        &["betting_market_rules_id", "new_name", "new_description"]
    }
}
