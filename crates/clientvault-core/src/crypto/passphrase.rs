//! Passphrase strength policy.
//!
//! Applied only when a key is first set up. Unlock attempts are never checked
//! against it: a wrong passphrase is reported as a plain mismatch.

use crate::error::{Result, VaultError};

/// Minimum passphrase length in characters.
const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Characters that satisfy the special-character requirement.
const SPECIAL_CHARACTERS: &str = "!@#$%^&*";

/// Check that a new passphrase meets the setup policy.
///
/// # Requirements
///
/// - At least 8 characters long
/// - Not empty or only whitespace
/// - At least one ASCII uppercase letter, one ASCII lowercase letter and one digit
/// - At least one of `!@#$%^&*`
///
/// # Examples
///
/// ```
/// use clientvault_core::crypto::check_passphrase_strength;
///
/// assert!(check_passphrase_strength("Correct-Horse-1!").is_ok());
/// assert!(check_passphrase_strength("short").is_err());
/// ```
pub fn check_passphrase_strength(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(VaultError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let length = passphrase.chars().count();
    if length < MIN_PASSPHRASE_LENGTH {
        return Err(VaultError::InvalidInput(format!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_LENGTH, length
        )));
    }

    let mut missing = Vec::new();
    if !passphrase.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("an uppercase letter");
    }
    if !passphrase.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("a lowercase letter");
    }
    if !passphrase.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a digit");
    }
    if !passphrase.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        missing.push("one of !@#$%^&*");
    }

    if !missing.is_empty() {
        return Err(VaultError::InvalidInput(format!(
            "Passphrase must contain {}",
            missing.join(", ")
        )));
    }

    Ok(())
}
