//! Passphrase prompting and session unlock with retry logic.

use std::io::IsTerminal;

use clientvault_core::{KeyMetadataStore, KeySession, KeyState, UnlockOutcome};

use crate::errors::CliError;
use crate::helpers::{passphrase_from_env, prompt_passphrase};
use crate::ui::Spinner;

use super::resolver::missing_key_hint;

const FORGOT_HINT: &str =
    "Hint: If you forgot your passphrase, records sealed under it cannot be recovered.";

/// Unlock `session`, prompting up to `max_attempts` times when interactive.
///
/// A passphrase from CLIENTVAULT_PASSPHRASE gets exactly one attempt.
pub fn unlock_with_retry<S: KeyMetadataStore + ?Sized>(
    session: &mut KeySession<'_, S>,
    no_input: bool,
    max_attempts: u32,
    quiet: bool,
) -> anyhow::Result<()> {
    if session.state() == KeyState::NoKeySet {
        return Err(CliError::not_found(
            format!(
                "No encryption key set up for user '{}'",
                session.user_id()
            ),
            missing_key_hint(),
        )
        .into());
    }

    let interactive = std::io::stdin().is_terminal() && !no_input;
    let max_attempts: u32 = if interactive && !passphrase_from_env() {
        max_attempts.max(1)
    } else {
        1
    };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let passphrase = prompt_passphrase(interactive)?;

        let spinner = Spinner::new("Deriving key", quiet);
        let outcome = session.unlock_secret(&passphrase);
        spinner.finish();

        match outcome? {
            UnlockOutcome::Unlocked => return Ok(()),
            UnlockOutcome::Rejected if max_attempts == 1 => {
                return Err(CliError::auth_failed("Incorrect passphrase.").into());
            }
            UnlockOutcome::Rejected => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    return Err(CliError::auth_failed_with_hint(
                        "Too many failed passphrase attempts.",
                        FORGOT_HINT,
                    )
                    .into());
                }
                eprintln!(
                    "Incorrect passphrase. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
        }
    }
}
