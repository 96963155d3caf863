use std::path::PathBuf;

use clientvault_core::SqliteStore;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_store_path, write_config, VaultConfig};
use crate::errors::CliError;

const DEFAULT_USER: &str = "default";

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::conflict(
            format!("Config already exists at {}", config_path.display()),
            "Use --force to overwrite it",
        )
        .into());
    }

    let store_path = match args.path.as_deref().or(ctx.cli().store.as_deref()) {
        Some(path) => PathBuf::from(path),
        None => default_store_path()?,
    };
    let user_id = ctx
        .cli()
        .user
        .as_deref()
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .unwrap_or(DEFAULT_USER)
        .to_string();

    if store_path.exists() {
        // Reuse an existing store, but only if it is one of ours.
        SqliteStore::open(&store_path)?;
    } else {
        if let Some(parent) = store_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }
        SqliteStore::create(&store_path)?;
    }

    write_config(&config_path, &VaultConfig::new(store_path.clone(), &user_id))?;

    if !ctx.quiet() {
        println!("Store: {}", store_path.display());
        println!("Config: {}", config_path.display());
        println!("User: {}", user_id);
        println!();
        println!("Next, set up your encryption key:\n  clientvault setup");
    }
    Ok(())
}
