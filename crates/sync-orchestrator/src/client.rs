//! JSON-RPC ledger client.

use async_trait::async_trait;
use bookie_core::config::LedgerConfig;
use bookie_core::types::{ObjectId, ObjectKind, ObjectSnapshot, ProposalEnvelope, RemoteRecord};
use bookie_core::{Error, Result};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Read access to the ledger's object database. Only the listing calls the
/// planner needs; broadcasting lives elsewhere.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn get_objects(&self, ids: &[ObjectId]) -> Result<Vec<RemoteRecord>>;
    async fn list_sports(&self) -> Result<Vec<RemoteRecord>>;
    async fn list_event_groups(&self, sport: &ObjectId) -> Result<Vec<RemoteRecord>>;
    async fn list_events(&self, event_group: &ObjectId) -> Result<Vec<RemoteRecord>>;
    async fn list_market_groups(&self, event: &ObjectId) -> Result<Vec<RemoteRecord>>;
    async fn list_markets(&self, market_group: &ObjectId) -> Result<Vec<RemoteRecord>>;
    /// Pending proposals relevant to `account`.
    async fn list_proposals(&self, account: &str) -> Result<Vec<ProposalEnvelope>>;
}

/// Walk the whole object tree and materialize it as one snapshot for the
/// planning pass.
pub async fn snapshot(client: &dyn LedgerClient) -> Result<ObjectSnapshot> {
    let mut snapshot = ObjectSnapshot::new();
    for sport in client.list_sports().await? {
        let sport_id = snapshot.insert(ObjectKind::Sport, sport)?;
        for group in client.list_event_groups(&sport_id).await? {
            let group_id = snapshot.insert(ObjectKind::EventGroup, group)?;
            for event in client.list_events(&group_id).await? {
                let event_id = snapshot.insert(ObjectKind::Event, event)?;
                for market_group in client.list_market_groups(&event_id).await? {
                    let market_group_id = snapshot.insert(ObjectKind::MarketGroup, market_group)?;
                    for market in client.list_markets(&market_group_id).await? {
                        snapshot.insert(ObjectKind::Market, market)?;
                    }
                }
            }
        }
    }
    debug!(objects = snapshot.len(), "snapshot assembled");
    Ok(snapshot)
}

/// A plain JSON-RPC 2.0 client against a ledger node's database API.
pub struct JsonRpcLedgerClient {
    node_url: String,
    http: reqwest::Client,
}

impl JsonRpcLedgerClient {
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Ledger {
                message: format!("cannot build HTTP client: {e}"),
                status: None,
            })?;
        Ok(Self {
            node_url: config.node_url.clone(),
            http,
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        debug!(method, "ledger call");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Ledger {
                message: format!("node answered {status} to '{method}'"),
                status: Some(status.as_u16()),
            });
        }
        let payload: Value = response.json().await.map_err(transport_error)?;
        if let Some(error) = payload.get("error") {
            return Err(Error::Ledger {
                message: format!("'{method}' failed: {error}"),
                status: None,
            });
        }
        payload.get("result").cloned().ok_or_else(|| Error::Ledger {
            message: format!("'{method}' answered without a result"),
            status: None,
        })
    }
}

/// Unpack a listing result. `get_objects` answers `null` for ids the node
/// does not know; those entries are skipped, not errors.
fn records(result: Value) -> Result<Vec<RemoteRecord>> {
    let items = match result {
        Value::Array(items) => items,
        other => {
            return Err(Error::MalformedRemote(format!(
                "expected a listing, got {other}"
            )))
        }
    };
    items
        .into_iter()
        .filter(|item| !item.is_null())
        .map(RemoteRecord::from_value)
        .collect()
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::Ledger {
        message: e.to_string(),
        status: e.status().map(|s| s.as_u16()),
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn get_objects(&self, ids: &[ObjectId]) -> Result<Vec<RemoteRecord>> {
        records(self.call("get_objects", json!([ids])).await?)
    }

    async fn list_sports(&self) -> Result<Vec<RemoteRecord>> {
        records(self.call("list_sports", json!([])).await?)
    }

    async fn list_event_groups(&self, sport: &ObjectId) -> Result<Vec<RemoteRecord>> {
        records(self.call("list_event_groups", json!([sport])).await?)
    }

    async fn list_events(&self, event_group: &ObjectId) -> Result<Vec<RemoteRecord>> {
        records(self.call("list_events_in_group", json!([event_group])).await?)
    }

    async fn list_market_groups(&self, event: &ObjectId) -> Result<Vec<RemoteRecord>> {
        records(self.call("list_betting_market_groups", json!([event])).await?)
    }

    async fn list_markets(&self, market_group: &ObjectId) -> Result<Vec<RemoteRecord>> {
        records(self.call("list_betting_markets", json!([market_group])).await?)
    }

    async fn list_proposals(&self, account: &str) -> Result<Vec<ProposalEnvelope>> {
        let result = self
            .call("get_proposed_transactions", json!([account]))
            .await?;
        serde_json::from_value(result).map_err(|e| {
            Error::MalformedRemote(format!("unreadable proposal listing: {e}"))
        })
    }
}
