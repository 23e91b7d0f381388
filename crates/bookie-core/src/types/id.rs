//! Ledger object ids and object kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger object id of the form `space.type.instance`, e.g. `1.24.218`.
///
/// Ids of the form `0.0.n` are not real object ids: they are relative
/// references into the operation list of a pending proposal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parts(&self) -> Option<(u64, u64, u64)> {
        let mut it = self.0.split('.');
        let a = it.next()?.parse().ok()?;
        let b = it.next()?.parse().ok()?;
        let c = it.next()?.parse().ok()?;
        if it.next().is_some() {
            return None;
        }
        Some((a, b, c))
    }

    /// True when the id is syntactically a ledger object id.
    pub fn is_well_formed(&self) -> bool {
        self.parts().is_some()
    }

    /// The instance number, for numeric ordering of sibling objects
    /// (string order would put `1.25.10` before `1.25.9`).
    pub fn instance(&self) -> Option<u64> {
        self.parts().map(|(_, _, instance)| instance)
    }

    /// Operation index encoded by a relative reference into a pending
    /// proposal. Only ids of the literal form `0.0.n` qualify.
    pub fn pending_op_index(&self) -> Option<usize> {
        match self.parts() {
            Some((0, 0, n)) => Some(n as usize),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The kind of on-chain object a record or local entity corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Sport,
    EventGroup,
    Event,
    MarketGroup,
    Market,
    Rule,
    Proposal,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Sport => "sport",
            ObjectKind::EventGroup => "event_group",
            ObjectKind::Event => "event",
            ObjectKind::MarketGroup => "market_group",
            ObjectKind::Market => "market",
            ObjectKind::Rule => "rule",
            ObjectKind::Proposal => "proposal",
        };
        f.write_str(name)
    }
}
