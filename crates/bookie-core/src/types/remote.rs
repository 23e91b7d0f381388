//! Remote ledger records, proposal envelopes, and the object snapshot.

use crate::types::{Description, ObjectId, ObjectKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A record as returned by the ledger client: either a committed object or
/// an operation payload bundled inside a pending proposal. Committed
/// objects carry their id; proposal payloads do not, so matching against
/// them is purely content-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteRecord(Map<String, Value>);

impl RemoteRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::MalformedRemote(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn contains_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.0.contains_key(*k))
    }

    /// The ledger id of a committed object. Empty or absent for payloads
    /// nested in pending proposals.
    pub fn id(&self) -> Option<ObjectId> {
        match self.get_str("id") {
            Some(id) if !id.is_empty() => Some(ObjectId::from(id)),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.get_str("status")
    }

    /// Read `name`, falling back to the update-shaped `new_{name}` alias.
    pub fn field_or_new(&self, name: &str) -> Option<&Value> {
        self.0
            .get(name)
            .or_else(|| self.0.get(&format!("new_{name}")))
    }

    pub fn str_or_new(&self, name: &str) -> Option<&str> {
        self.field_or_new(name).and_then(Value::as_str)
    }

    /// The description-like field under `field` (or its `new_` alias),
    /// parsed into localized pairs.
    pub fn description_at(&self, field: &str) -> Option<Description> {
        self.field_or_new(field)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// One operation inside a proposed transaction, carried on-chain as a
/// two-element array `[op_type, payload]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation(pub u64, pub RemoteRecord);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedTransaction {
    pub operations: Vec<Operation>,
}

/// A bundle of not-yet-committed operations. Operations inside the bundle
/// reference each other by position (`0.0.n`) rather than by assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalEnvelope {
    #[serde(default)]
    pub id: Option<ObjectId>,
    pub proposed_transaction: ProposedTransaction,
}

impl ProposalEnvelope {
    /// The payload of operation `index`, if the proposal has one.
    pub fn operation(&self, index: usize) -> Option<&RemoteRecord> {
        self.proposed_transaction
            .operations
            .get(index)
            .map(|op| &op.1)
    }

    /// Operation payloads in proposal order.
    pub fn operations(&self) -> impl Iterator<Item = &RemoteRecord> {
        self.proposed_transaction.operations.iter().map(|op| &op.1)
    }

    pub fn len(&self) -> usize {
        self.proposed_transaction.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposed_transaction.operations.is_empty()
    }
}

/// The materialized view of remote objects for one sync pass, keyed by
/// ledger id. Populated by the ledger client, read-only for the core.
#[derive(Debug, Clone, Default)]
pub struct ObjectSnapshot {
    objects: BTreeMap<ObjectId, (ObjectKind, RemoteRecord)>,
}

impl ObjectSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a committed record under its own id. Records without an id
    /// cannot be addressed and are rejected.
    pub fn insert(&mut self, kind: ObjectKind, record: RemoteRecord) -> Result<ObjectId> {
        let id = record.id().ok_or_else(|| {
            Error::MalformedRemote(format!("snapshot record of kind {kind} has no id"))
        })?;
        self.objects.insert(id.clone(), (kind, record));
        Ok(id)
    }

    pub fn get(&self, id: &ObjectId) -> Option<&RemoteRecord> {
        self.objects.get(id).map(|(_, r)| r)
    }

    pub fn kind_of(&self, id: &ObjectId) -> Option<ObjectKind> {
        self.objects.get(id).map(|(k, _)| *k)
    }

    /// True when `id` is an absolute, well-formed id that resolves to a
    /// known object of the expected kind. Relative proposal references
    /// never validate.
    pub fn valid_object_id(&self, id: &ObjectId, kind: ObjectKind) -> bool {
        id.is_well_formed()
            && id.pending_op_index().is_none()
            && self.kind_of(id) == Some(kind)
    }

    /// All records of one kind, in id order.
    pub fn of_kind(&self, kind: ObjectKind) -> Vec<&RemoteRecord> {
        self.objects
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, r)| r)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
