//! Accord configuration file handling
//!
//! Configuration files are TOML and live under the platform data directory
//! by default (`~/.local/share/accord/config.toml` on Linux).
//!
//! ## Operator vs Governed Settings
//!
//! The file holds the bootstrap values (initial price, initial administrators)
//! and deployment settings (state path, logging). Once the state snapshot
//! exists, the price and the administrator set are owned by the governance
//! workflow; editing them here has no effect on an existing snapshot.

use accord::identity::AccountId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccordConfig {
    /// Bootstrap values for a fresh engine
    pub governance: GovernanceConfig,

    /// Snapshot storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Price committed before any proposal has passed. Must be nonzero.
    pub initial_price: u64,

    /// Identities holding the administrator capability at creation.
    pub administrators: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the CBOR state snapshot
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl AccordConfig {
    pub fn new(administrators: Vec<String>, initial_price: u64, state_path: PathBuf) -> Self {
        Self {
            governance: GovernanceConfig {
                initial_price,
                administrators,
            },
            storage: StorageConfig { state_path },
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: AccordConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        config.administrator_ids()?;
        if config.governance.initial_price == 0 {
            return Err(format!(
                "Invalid config file '{}': initial_price must be nonzero",
                path.display()
            )
            .into());
        }

        Ok(config)
    }

    /// Validated administrator identities.
    pub fn administrator_ids(&self) -> Result<Vec<AccountId>, Box<dyn std::error::Error>> {
        if self.governance.administrators.is_empty() {
            return Err("Config must list at least one administrator".into());
        }
        let mut ids = Vec::with_capacity(self.governance.administrators.len());
        for raw in &self.governance.administrators {
            let id = AccountId::new(raw.as_str())
                .map_err(|e| format!("Invalid administrator '{}': {}", raw, e))?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Generate configuration content as a string with comments
    pub fn generate_toml(&self) -> Result<String, Box<dyn std::error::Error>> {
        let administrators = toml::Value::try_from(&self.governance.administrators)
            .map_err(|e| format!("Failed to serialize administrators: {}", e))?;
        let state_path = toml::Value::String(self.storage.state_path.display().to_string());

        Ok(format!(
            r#"# Accord Configuration
#
# [governance] holds BOOTSTRAP values only. They are read once, when the
# state snapshot is created. After that the price changes only through
# executed proposals and administrators only through grant-admin/revoke-admin.

[governance]
# Price committed before any proposal passes (nonzero)
initial_price = {initial_price}

# Identities holding the administrator capability at creation
administrators = {administrators}

[storage]
# CBOR state snapshot (member roles, proposals, ballots, phase, price)
state_path = {state_path}

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides)
level = "{level}"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/accord/accord.log"
"#,
            initial_price = self.governance.initial_price,
            administrators = administrators,
            state_path = state_path,
            level = self.logging.level,
        ))
    }

    /// Write the commented configuration file
    pub fn write_commented(&self, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = self.generate_toml()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

fn data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("accord")
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    data_root().join("config.toml")
}

/// Get the default state snapshot path
pub fn default_state_path() -> PathBuf {
    data_root().join("state.cbor")
}
