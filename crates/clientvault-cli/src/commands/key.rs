//! Key lifecycle commands: setup, unlock, status, metadata.

use std::io::IsTerminal;

use clientvault_core::{KeyState, RecordKind, RecordStore};
use secrecy::ExposeSecret;

use crate::app::{missing_key_hint, AppContext};
use crate::cli::PassphraseArgs;
use crate::errors::CliError;
use crate::helpers::prompt_setup_passphrase;
use crate::output::status_json;
use crate::ui::Spinner;

pub fn handle_setup(ctx: &AppContext, args: &PassphraseArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let mut session = ctx.load_session(&store)?;
    if session.state() != KeyState::NoKeySet {
        return Err(CliError::conflict(
            format!(
                "Encryption key already set up for user '{}'",
                session.user_id()
            ),
            "The key cannot be replaced. Run:\n  clientvault unlock",
        )
        .into());
    }

    let interactive = std::io::stdin().is_terminal() && !args.no_input;
    let passphrase = prompt_setup_passphrase(interactive)?;

    let spinner = Spinner::new("Deriving key", ctx.quiet());
    let result = session.setup(passphrase.expose_secret());
    spinner.finish();
    result?;

    if !ctx.quiet() {
        println!("Encryption key set up for user '{}'.", session.user_id());
        println!("Note: If you forget this passphrase, your records cannot be recovered.");
    }
    Ok(())
}

pub fn handle_unlock(ctx: &AppContext, args: &PassphraseArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.unlocked_session(&store, args.no_input)?;
    if !ctx.quiet() {
        println!("Passphrase accepted for user '{}'.", session.user_id());
    }
    Ok(())
}

/// Report key state and record counts. Never needs the passphrase.
pub fn handle_status(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.load_session(&store)?;

    let mut counts = Vec::with_capacity(RecordKind::ALL.len());
    for kind in RecordKind::ALL {
        let records = store.list_records(session.user_id(), Some(kind))?;
        counts.push((kind, records.len()));
    }

    if json {
        let value = status_json(session.user_id(), session.state(), &counts);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let key_line = match session.state() {
        KeyState::NoKeySet => "not set up",
        _ => "set up (locked)",
    };
    println!("User: {}", session.user_id());
    println!("Encryption key: {}", key_line);
    for (kind, count) in &counts {
        println!("{}: {}", kind, count);
    }
    if session.state() == KeyState::NoKeySet && !ctx.quiet() {
        println!();
        println!("{}", missing_key_hint());
    }
    Ok(())
}

/// Print the stored salt and validation marker. Contains no secrets.
pub fn handle_metadata(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let session = ctx.load_session(&store)?;
    let metadata = session.metadata().ok_or_else(|| {
        CliError::not_found(
            format!(
                "No encryption key set up for user '{}'",
                session.user_id()
            ),
            missing_key_hint(),
        )
    })?;
    println!("{}", serde_json::to_string_pretty(metadata)?);
    Ok(())
}
