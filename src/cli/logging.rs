//! Subscriber setup for the operator CLI.
//!
//! The level comes from `[logging] level` in the config file when one exists;
//! `RUST_LOG` takes precedence over it. Output goes to stderr unless
//! `[logging] file` names a log file, which is appended to.

use super::config::{AccordConfig, LoggingConfig};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Settings from the config file, or defaults when it is missing or unreadable.
pub fn settings(config_path: &Path) -> LoggingConfig {
    if !config_path.exists() {
        return LoggingConfig::default();
    }
    AccordConfig::load(config_path)
        .map(|config| config.logging)
        .unwrap_or_default()
}

/// Filter for `level`, overridden by `RUST_LOG` when set.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

pub fn init(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings(config_path);
    let filter = filter(&settings.level);

    match &settings.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("Failed to open log file '{}': {}", path.display(), e))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| e.to_string())?;
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}
