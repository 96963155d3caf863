use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_UNLOCK_ATTEMPTS;

#[derive(Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    pub store: StoreSection,
    pub user: UserSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSection {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecuritySection {
    /// Passphrase prompts before an interactive unlock gives up.
    #[serde(default = "default_unlock_attempts")]
    pub max_unlock_attempts: u32,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            max_unlock_attempts: DEFAULT_UNLOCK_ATTEMPTS,
        }
    }
}

fn default_unlock_attempts() -> u32 {
    DEFAULT_UNLOCK_ATTEMPTS
}

impl VaultConfig {
    pub fn new(store_path: PathBuf, user_id: impl Into<String>) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
            },
            user: UserSection { id: user_id.into() },
            security: SecuritySection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("vault.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<VaultConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &VaultConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("clientvault"));
        }
    }
    Ok(home_dir()?.join(".config").join("clientvault"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("clientvault"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("clientvault"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
