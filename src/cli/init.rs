use super::config::{default_state_path, AccordConfig};
use accord::governance::GovernanceEngine;
use accord::persistence::{FileSnapshotStore, SnapshotStore};
use std::path::{Path, PathBuf};
use tracing::info;

/// Initialize a deployment
///
/// Writes a commented config file and the initial state snapshot. The state
/// path defaults to `state.cbor` next to the config file. An existing config
/// or snapshot is only replaced with `--force`; replacing a snapshot discards
/// all governance history.
pub async fn execute(
    config_path: &Path,
    administrators: Vec<String>,
    initial_price: u64,
    state_path: Option<String>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    let state_path = state_path.map(PathBuf::from).unwrap_or_else(|| {
        config_path
            .parent()
            .map(|dir| dir.join("state.cbor"))
            .unwrap_or_else(default_state_path)
    });

    let config = AccordConfig::new(administrators, initial_price, state_path.clone());
    let engine = GovernanceEngine::new(config.administrator_ids()?, initial_price)?;

    let store = FileSnapshotStore::new(state_path);
    let _lock = store.lock().await?;
    if !force && store.load().await?.is_some() {
        return Err(format!(
            "State snapshot '{}' already exists (use --force to overwrite)",
            store.path().display()
        )
        .into());
    }
    store.save(&engine).await?;
    config.write_commented(config_path)?;

    info!(
        config = %config_path.display(),
        state = %store.path().display(),
        initial_price,
        "deployment initialized"
    );

    println!("✅ Accord initialized");
    println!();
    println!("Config: {}", config_path.display());
    println!("State:  {}", store.path().display());
    println!("Price:  {}", initial_price);
    println!(
        "Administrators: {}",
        config.governance.administrators.join(", ")
    );
    println!();
    println!("Next: register members with `accord add-member --caller <admin> <identity> --college <producer|consumer>`");

    Ok(())
}
