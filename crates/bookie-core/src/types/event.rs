//! Events: a scheduled match between two teams.

use crate::naming::capitalize_words;
use crate::types::{Description, EventGroup, LocalEntity, ObjectId, ObjectKind, Sport};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Authored event data before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventSpec {
    #[serde(default)]
    pub teams: Vec<String>,
    pub season: Option<Description>,
    pub start_time: Option<DateTime<Utc>>,
    pub status: Option<String>,
    /// Explicit localized name; when absent it is derived from the teams.
    pub name: Option<Description>,
    pub id: Option<ObjectId>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A scheduled match. Always exactly two teams; index 0 is home.
#[derive(Debug, Clone)]
pub struct Event {
    pub identifier: String,
    pub teams: [String; 2],
    pub name: Description,
    pub season: Option<Description>,
    pub start_time: DateTime<Utc>,
    pub status: Option<String>,
    pub event_group: Arc<EventGroup>,
    pub id: Option<ObjectId>,
    pub extra: BTreeMap<String, Value>,
}

impl Event {
    pub fn new(spec: EventSpec, event_group: Arc<EventGroup>) -> Result<Self> {
        if spec.teams.len() != 2 {
            return Err(Error::Config {
                message: format!(
                    "event under {} must have exactly two teams, got {}",
                    event_group.identifier,
                    spec.teams.len()
                ),
            });
        }
        let teams = [spec.teams[0].clone(), spec.teams[1].clone()];
        let start_time = spec.start_time.ok_or_else(|| Error::MissingMandatoryField {
            entity: format!("event under {}", event_group.identifier),
            field: "start_time",
        })?;
        let name = spec.name.unwrap_or_else(|| {
            let mut derived = Description::new();
            derived.push(
                "en",
                format!(
                    "{} @ {}",
                    capitalize_words(&teams[0]),
                    capitalize_words(&teams[1])
                ),
            );
            derived
        });
        let identifier = format!(
            "{}/{}",
            event_group.identifier,
            name.get("en").unwrap_or_default()
        );
        Ok(Self {
            identifier,
            teams,
            name,
            season: spec.season,
            start_time,
            status: spec.status,
            event_group,
            id: spec.id,
            extra: spec.extra,
        })
    }

    pub fn sport(&self) -> &Sport {
        &self.event_group.sport
    }
}

impl LocalEntity for Event {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Event
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn describe(&self) -> Description {
        self.name.clone()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn parent_id(&self) -> Option<&ObjectId> {
        self.event_group.id.as_ref()
    }

    fn parent(&self) -> Option<&dyn LocalEntity> {
        Some(self.event_group.as_ref())
    }

    fn parent_link_field(&self) -> Option<&'static str> {
        Some("event_group_id")
    }

    fn description_field(&self) -> &'static str {
        "name"
    }

    fn create_keys(&self) -> &'static [&'static str] {
        &["name", "season", "start_time", "event_group_id"]
    }

    fn update_keys(&self) -> &'static [&'static str] {
        &[
            "event_id",
            "new_name",
            "new_season",
            "new_start_time",
            "new_event_group_id",
        ]
    }
}
