//! Application context for the Client Vault CLI.
//!
//! Bundles CLI arguments with the lazily-loaded config file.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use clientvault_core::{KeySession, SqliteStore, VaultError};

use crate::cli::Cli;
use crate::config::VaultConfig;
use crate::constants::DEFAULT_UNLOCK_ATTEMPTS;
use crate::errors::CliError;

use super::resolver::{
    load_config, missing_config_message, missing_store_hint, missing_store_message,
    missing_user_hint, missing_user_message, resolve_config_path,
};
use super::unlock::unlock_with_retry;

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<VaultConfig>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, if one exists. Loaded once.
    pub fn config(&self) -> anyhow::Result<Option<&VaultConfig>> {
        Ok(self.config.get_or_try_init(load_config)?.as_ref())
    }

    /// Store path from `--store`/`CLIENTVAULT_STORE`, then config.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.store.as_deref() {
            return Ok(PathBuf::from(path));
        }
        match self.config()? {
            Some(config) => Ok(PathBuf::from(&config.store.path)),
            None => Err(CliError::not_found(
                missing_config_message(&resolve_config_path()?),
                missing_store_hint(),
            )
            .into()),
        }
    }

    /// User id from `--user`/`CLIENTVAULT_USER`, then config.
    pub fn user_id(&self) -> anyhow::Result<String> {
        if let Some(user) = self.cli.user.as_deref() {
            if !user.trim().is_empty() {
                return Ok(user.trim().to_string());
            }
        }
        match self.config()? {
            Some(config) if !config.user.id.trim().is_empty() => Ok(config.user.id.clone()),
            _ => Err(CliError::not_found(missing_user_message(), missing_user_hint()).into()),
        }
    }

    pub fn max_unlock_attempts(&self) -> anyhow::Result<u32> {
        let attempts = self
            .config()?
            .map(|config| config.security.max_unlock_attempts)
            .unwrap_or(DEFAULT_UNLOCK_ATTEMPTS);
        Ok(attempts.max(1))
    }

    /// Open the configured store, mapping a missing file to a hinted error.
    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.store_path()?;
        tracing::debug!(path = %path.display(), "opening store");
        match SqliteStore::open(&path) {
            Ok(store) => Ok(store),
            Err(VaultError::NotFound(_)) => Err(CliError::not_found(
                missing_store_message(&path),
                missing_store_hint(),
            )
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Load the current user's key session. The session starts locked.
    pub fn load_session<'s>(
        &self,
        store: &'s SqliteStore,
    ) -> anyhow::Result<KeySession<'s, SqliteStore>> {
        Ok(KeySession::load(store, self.user_id()?)?)
    }

    /// Load the current user's session and unlock it, prompting as needed.
    pub fn unlocked_session<'s>(
        &self,
        store: &'s SqliteStore,
        no_input: bool,
    ) -> anyhow::Result<KeySession<'s, SqliteStore>> {
        let mut session = self.load_session(store)?;
        unlock_with_retry(&mut session, no_input, self.max_unlock_attempts()?, self.quiet())?;
        Ok(session)
    }
}
