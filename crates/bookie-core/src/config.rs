//! Configuration management for the bookie-sync system.

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub accounts: AccountsConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the ledger node.
    pub node_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// Account under which create/update proposals are emitted.
    pub proposer: String,
    pub approver: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SyncConfig {
    /// Path to the local sports definitions, if any.
    pub sports_path: Option<String>,
    /// When set, intents are logged but never handed to the ledger client.
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            ledger: LedgerConfig {
                node_url: env::var("LEDGER_NODE_URL").map_err(|_| Error::Config {
                    message: "LEDGER_NODE_URL environment variable not set".to_string(),
                })?,
                timeout_secs: env::var("LEDGER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            accounts: AccountsConfig {
                proposer: env::var("PROPOSER_ACCOUNT").map_err(|_| Error::Config {
                    message: "PROPOSER_ACCOUNT environment variable not set".to_string(),
                })?,
                approver: env::var("APPROVER_ACCOUNT").ok(),
            },
            sync: SyncConfig {
                sports_path: env::var("SPORTS_PATH").ok(),
                dry_run: env::var("DRY_RUN")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
        })
    }

    /// Load configuration for testing (with defaults).
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            ledger: LedgerConfig {
                node_url: "http://localhost:8090".to_string(),
                timeout_secs: 5,
            },
            accounts: AccountsConfig {
                proposer: "init0".to_string(),
                approver: Some("init1".to_string()),
            },
            sync: SyncConfig {
                sports_path: None,
                dry_run: true,
            },
        }
    }
}
