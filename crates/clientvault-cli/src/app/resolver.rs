//! Path and user resolution from flags, environment, and config.

use std::path::{Path, PathBuf};

use crate::config::{default_config_path, read_config, VaultConfig};
use crate::constants::CONFIG_ENV;

/// Resolve the config file path, checking CLIENTVAULT_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Read the config file if it exists.
pub fn load_config() -> anyhow::Result<Option<VaultConfig>> {
    let config_path = resolve_config_path()?;
    if !config_path.exists() {
        return Ok(None);
    }
    read_config(&config_path).map(Some)
}

/// Error message when the store file is missing.
pub fn missing_store_message(path: &Path) -> String {
    format!("No client vault found at {}", path.display())
}

pub fn missing_store_hint() -> &'static str {
    "Run:\n  clientvault init\n\nOr specify a store path:\n  CLIENTVAULT_STORE=/path/to/vault.db clientvault init"
}

/// Error message when neither flags nor config name a store.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No store configured (no --store flag and no config at {})",
        config_path.display()
    )
}

pub fn missing_user_message() -> &'static str {
    "No user configured (no --user flag and no [user] id in config)"
}

pub fn missing_user_hint() -> &'static str {
    "Run:\n  clientvault init --user <ID>\n\nOr pass a user:\n  CLIENTVAULT_USER=<ID> clientvault status"
}

/// Hint shown when a user has no encryption key yet.
pub fn missing_key_hint() -> &'static str {
    "Run:\n  clientvault setup"
}
