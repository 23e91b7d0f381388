//! Individual betting market legs.

use crate::types::{Description, LocalEntity, ObjectId, ObjectKind};

/// One market leg of a group, with its description already substituted.
/// Built by [`MarketGroup::expand_markets`](crate::types::MarketGroup::expand_markets)
/// in authoring order; the position within the group pairs the leg with
/// its outcome group at grading time.
#[derive(Debug, Clone)]
pub struct Market {
    pub identifier: String,
    pub description: Description,
    /// Ledger id of the owning group, when known.
    pub group_id: Option<ObjectId>,
    pub id: Option<ObjectId>,
}

impl LocalEntity for Market {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Market
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

    fn parent_id(&self) -> Option<&ObjectId> {
        self.group_id.as_ref()
    }

    fn parent_kind(&self) -> Option<ObjectKind> {
        Some(ObjectKind::MarketGroup)
    }

    fn parent_link_field(&self) -> Option<&'static str> {
        Some("group_id")
    }

    fn create_keys(&self) -> &'static [&'static str] {
        &["description", "payout_condition", "group_id"]
    }

    fn update_keys(&self) -> &'static [&'static str] {
        &["betting_market_id", "new_description", "new_group_id"]
    }
}
