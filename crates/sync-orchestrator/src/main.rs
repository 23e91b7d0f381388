//! Bookie Sync
//!
//! One planning pass: load the authored sports catalog, fetch remote
//! state, and log a sync intent per market group.

use anyhow::Result;
use bookie_core::config::Config;
use sync_orchestrator::client::{snapshot, JsonRpcLedgerClient, LedgerClient};
use sync_orchestrator::{Catalog, SyncRunner};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sync_orchestrator=info,sync_engine=warn,hyper=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ledger sync");

    let config = Config::from_env()?;
    let Some(sports_path) = config.sync.sports_path.clone() else {
        warn!("SPORTS_PATH not set, nothing to sync");
        return Ok(());
    };
    let catalog = Catalog::load(&sports_path)?;
    info!(
        sports = catalog.sports.len(),
        market_groups = catalog.market_groups.len(),
        "catalog loaded"
    );

    let client = JsonRpcLedgerClient::new(&config.ledger)?;
    let snapshot = snapshot(&client).await?;
    let proposals = client.list_proposals(&config.accounts.proposer).await?;
    info!(
        objects = snapshot.len(),
        proposals = proposals.len(),
        "remote state fetched"
    );

    let runner = SyncRunner::new(&snapshot, &proposals);
    let mut pending_work = 0usize;
    for group in &catalog.market_groups {
        let intent = runner.plan_market_group(group)?;
        info!(
            intent = %intent.id,
            entity = %intent.entity,
            decision = ?intent.decision,
            "planned"
        );
        if intent.requires_proposal() {
            pending_work += 1;
        }
    }

    if config.sync.dry_run {
        info!(pending_work, "dry run, no proposals handed off");
    } else {
        info!(pending_work, "intents emitted for broadcast");
    }
    Ok(())
}
