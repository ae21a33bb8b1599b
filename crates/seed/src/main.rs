//! Bootstraps the first collection of a fresh store and prints its history
//! export.

mod starter;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use designvault_core::{CollectionStore, StatusSet};
use designvault_history::{HistoryLedger, LedgerConfig};
use designvault_updates::{OrchestratorConfig, UpdateOrchestrator};

const BASELINE_NAME: &str = "Enterprise Modern Baseline";
const BASELINE_DESCRIPTION: &str = "Baseline collection: enterprise modern theme, \
    per-module palettes (ai, nose, hunter) and the complete component inventory.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "designvault_seed=debug,designvault_updates=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let ledger_config = LedgerConfig::from_env()?;
    let orchestrator_config = OrchestratorConfig::from_env()?;
    tracing::info!(
        max_snapshots = ledger_config.max_snapshots_per_collection,
        hook_timeout_secs = orchestrator_config.hook_timeout.as_secs(),
        "Loaded configuration"
    );

    // --- Store + ledger ---
    let store = Arc::new(RwLock::new(CollectionStore::new()));
    let ledger = Arc::new(RwLock::new(HistoryLedger::new(ledger_config)));

    let orchestrator = UpdateOrchestrator::new(Arc::clone(&store), Arc::clone(&ledger), orchestrator_config);

    // --- Baseline collection ---
    let collection_id = {
        let mut store = store.write().await;
        let created = store.create(BASELINE_NAME, BASELINE_DESCRIPTION, "1.0.0", StatusSet::default())?;
        store.populate_current(&starter::reference_attributes())?;
        created.id
    };

    let init = orchestrator.initialize_for_collection(&collection_id).await?;
    tracing::info!(
        collection_id = %init.collection_id,
        validators = ?init.validators_registered,
        "History enabled"
    );

    let activation = orchestrator.set_active_default(&collection_id).await?;
    tracing::info!(
        collection_id = %collection_id,
        entry_id = %activation.id,
        "Collection set as active and default"
    );

    let stats = store.read().await.stats(&collection_id)?;
    tracing::info!(
        collection_id = %collection_id,
        version = %stats.version,
        color_tokens = stats.stats.color_tokens,
        components = stats.stats.components,
        animations = stats.stats.animations,
        icon_libraries = stats.stats.icon_libraries,
        breakpoints = stats.stats.breakpoints,
        tech_libraries = stats.stats.tech_libraries,
        "Baseline collection ready"
    );

    let export = ledger.read().await.export_history(&collection_id, "json")?;
    println!("{export}");

    Ok(())
}
