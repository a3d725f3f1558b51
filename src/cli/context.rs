//! Opening the governance service behind a config file.

use super::config::AccordConfig;
use accord::governance::GovernanceEngine;
use accord::identity::AccountId;
use accord::persistence::FileSnapshotStore;
use accord::service::GovernanceService;
use std::path::Path;
use std::sync::Arc;

/// Load the config at `config_path` and host its state snapshot.
///
/// A missing snapshot is created from the config's bootstrap values.
pub async fn open(config_path: &Path) -> Result<GovernanceService, Box<dyn std::error::Error>> {
    if !config_path.exists() {
        return Err(format!(
            "No config file at '{}'. Run `accord init` first.",
            config_path.display()
        )
        .into());
    }

    let config = AccordConfig::load(config_path)?;
    let administrators = config.administrator_ids()?;
    let initial_price = config.governance.initial_price;
    let store = Arc::new(FileSnapshotStore::new(config.storage.state_path.clone()));

    let service = GovernanceService::open(store, move || {
        GovernanceEngine::new(administrators, initial_price)
    })
    .await?;
    Ok(service)
}

/// Parse an identity argument, naming the argument on failure.
pub fn account(raw: &str, what: &str) -> Result<AccountId, Box<dyn std::error::Error>> {
    let id = AccountId::new(raw).map_err(|e| format!("Invalid {} '{}': {}", what, raw, e))?;
    Ok(id)
}

/// Fresh deployment under `dir` with administrator `root` and price 100.
#[cfg(test)]
pub async fn test_deployment(dir: &Path) -> std::path::PathBuf {
    let config_path = dir.join("config.toml");
    super::init::execute(&config_path, vec!["root".to_string()], 100, None, false)
        .await
        .unwrap();
    config_path
}
