//! Input handling helpers for passphrases and record data.

use std::io::{self, IsTerminal, Read};

use clientvault_core::crypto::check_passphrase_strength;
use dialoguer::Password;
use secrecy::SecretString;

use crate::constants::PASSPHRASE_ENV;
use crate::errors::CliError;

fn env_passphrase() -> Option<String> {
    std::env::var(PASSPHRASE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Whether the passphrase comes from the environment rather than a prompt.
pub fn passphrase_from_env() -> bool {
    env_passphrase().is_some()
}

/// Prompt for passphrase, or read from CLIENTVAULT_PASSPHRASE env var.
pub fn prompt_passphrase(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(value) = env_passphrase() {
        return Ok(SecretString::from(value));
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set {}.",
            PASSPHRASE_ENV
        ));
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for a new passphrase with confirmation, or read it from the env var.
///
/// The strength policy is checked here so an interactive user can try again;
/// a passphrase from the environment that fails it is an input error.
pub fn prompt_setup_passphrase(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(value) = env_passphrase() {
        check_passphrase_strength(&value).map_err(|e| {
            CliError::invalid_input(format!("Passphrase does not meet requirements: {}", e))
        })?;
        return Ok(SecretString::from(value));
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set {}.",
            PASSPHRASE_ENV
        ));
    }
    loop {
        let passphrase = Password::new()
            .with_prompt("Enter passphrase")
            .with_confirmation("Confirm passphrase", "Passphrases do not match")
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))?;
        if let Err(err) = check_passphrase_strength(&passphrase) {
            eprintln!("Passphrase does not meet requirements: {}", err);
            continue;
        }
        return Ok(SecretString::from(passphrase));
    }
}

/// Read record fields as a JSON object from `--data` or piped stdin.
pub fn read_record_data(no_input: bool, data: Option<String>) -> anyhow::Result<serde_json::Value> {
    let raw = match data {
        Some(value) => value,
        None => {
            if io::stdin().is_terminal() {
                let message = if no_input {
                    "--no-input requires record data from --data or stdin"
                } else {
                    "Record data is required: pass --data '{...}' or pipe JSON via stdin"
                };
                return Err(CliError::invalid_input(message).into());
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            buffer
        }
    };
    parse_record_json(&raw)
}

pub fn parse_record_json(raw: &str) -> anyhow::Result<serde_json::Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::invalid_input("Record data is empty").into());
    }
    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| CliError::invalid_input(format!("Record data is not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(CliError::invalid_input("Record data must be a JSON object").into());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_json_accepts_object() {
        let value = parse_record_json(r#" {"email": "a@b.com"} "#).unwrap();
        assert_eq!(value["email"], "a@b.com");
    }

    #[test]
    fn test_parse_record_json_rejects_non_objects() {
        for raw in ["", "   ", "[1, 2]", "\"text\"", "{not json"] {
            let err = parse_record_json(raw).unwrap_err();
            assert!(err.downcast_ref::<CliError>().is_some(), "input {:?}", raw);
        }
    }
}
