//! Sports and event groups: the top of the entity tree.

use crate::types::{Description, LocalEntity, ObjectId, ObjectKind};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Authored sport data before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SportSpec {
    pub identifier: Option<String>,
    pub name: Option<Description>,
    #[serde(default)]
    pub rules: Vec<String>,
    pub id: Option<ObjectId>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The root of one branch of the entity tree.
#[derive(Debug, Clone)]
pub struct Sport {
    pub identifier: String,
    pub name: Description,
    /// Names of the grading rules this sport owns.
    pub rule_names: Vec<String>,
    pub id: Option<ObjectId>,
    pub extra: BTreeMap<String, Value>,
}

impl Sport {
    pub fn new(spec: SportSpec) -> Result<Self> {
        let identifier = spec.identifier.ok_or_else(|| Error::MissingMandatoryField {
            entity: "sport".to_string(),
            field: "identifier",
        })?;
        let name = spec.name.ok_or_else(|| Error::MissingMandatoryField {
            entity: identifier.clone(),
            field: "name",
        })?;
        Ok(Self {
            identifier,
            name,
            rule_names: spec.rules,
            id: spec.id,
            extra: spec.extra,
        })
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rule_names.iter().any(|r| r == name)
    }
}

impl LocalEntity for Sport {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Sport
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn describe(&self) -> Description {
        self.name.clone()
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn description_field(&self) -> &'static str {
        "name"
    }

    fn create_keys(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn update_keys(&self) -> &'static [&'static str] {
        &["sport_id", "new_name"]
    }
}

/// Authored event-group data before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventGroupSpec {
    pub identifier: Option<String>,
    pub name: Option<Description>,
    pub id: Option<ObjectId>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A group of events within one sport (a league or season bracket).
#[derive(Debug, Clone)]
pub struct EventGroup {
    pub identifier: String,
    pub name: Description,
    pub sport: Arc<Sport>,
    pub id: Option<ObjectId>,
    pub extra: BTreeMap<String, Value>,
}

impl EventGroup {
    pub fn new(spec: EventGroupSpec, sport: Arc<Sport>) -> Result<Self> {
        let short = spec.identifier.ok_or_else(|| Error::MissingMandatoryField {
            entity: format!("event group under {}", sport.identifier),
            field: "identifier",
        })?;
        let name = spec.name.ok_or_else(|| Error::MissingMandatoryField {
            entity: short.clone(),
            field: "name",
        })?;
        Ok(Self {
            identifier: format!("{}/{}", sport.identifier, short),
            name,
            sport,
            id: spec.id,
            extra: spec.extra,
        })
    }
}

impl LocalEntity for EventGroup {
    fn kind(&self) -> ObjectKind {
        ObjectKind::EventGroup
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn describe(&self) -> Description {
        self.name.clone()
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn parent_id(&self) -> Option<&ObjectId> {
        self.sport.id.as_ref()
    }

    fn parent(&self) -> Option<&dyn LocalEntity> {
        Some(self.sport.as_ref())
    }

    fn parent_link_field(&self) -> Option<&'static str> {
        Some("sport_id")
    }

    fn description_field(&self) -> &'static str {
        "name"
    }

    fn create_keys(&self) -> &'static [&'static str] {
        &["name", "sport_id"]
    }

    fn update_keys(&self) -> &'static [&'static str] {
        &["event_group_id", "new_name", "new_sport_id"]
    }
}
