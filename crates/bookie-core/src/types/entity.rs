//! The seam between local entities and the reconciliation engine.

use crate::types::{Description, ObjectId, ObjectKind};

/// A locally authored entity as seen by the reconciliation engine.
///
/// Implementors are the nodes of the entity tree. The engine never needs
/// the concrete types: comparators read the comparable description, the
/// status, and the parent linkage; the pending-proposal special case walks
/// `parent()` to verify not-yet-committed parents recursively.
pub trait LocalEntity {
    fn kind(&self) -> ObjectKind;

    /// Human-readable identifier derived from the parent chain. Used for
    /// diagnostics only; never stored on-chain.
    fn identifier(&self) -> &str;

    /// The full comparable description, synthetic keys included.
    fn describe(&self) -> Description;

    fn status(&self) -> Option<&str> {
        None
    }

    /// The ledger id of this entity, when already known.
    fn id(&self) -> Option<&ObjectId>;

    /// The ledger id of the parent entity, when already known.
    fn parent_id(&self) -> Option<&ObjectId> {
        None
    }

    fn parent(&self) -> Option<&dyn LocalEntity> {
        None
    }

    fn parent_kind(&self) -> Option<ObjectKind> {
        self.parent().map(|p| p.kind())
    }

    /// Remote field linking a record of this kind to its parent (the
    /// update-shaped `new_` alias is probed automatically).
    fn parent_link_field(&self) -> Option<&'static str> {
        None
    }

    /// Remote field carrying the comparable description of this kind.
    fn description_field(&self) -> &'static str {
        "description"
    }

    /// Keys a create-shaped remote record of this kind may carry.
    fn create_keys(&self) -> &'static [&'static str];

    /// Keys an update-shaped remote record of this kind may carry (the
    /// id-bearing key plus the `new_` aliases).
    fn update_keys(&self) -> &'static [&'static str];
}
