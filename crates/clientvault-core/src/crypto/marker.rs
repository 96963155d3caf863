//! Key-set validation marker.
//!
//! At setup a fixed, known plaintext is encrypted under the freshly derived
//! key and stored next to the salt. A later passphrase is correct exactly when
//! it re-derives a key that opens the marker back to a known constant. Neither
//! the passphrase nor the key is ever persisted.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::cipher::{decrypt, encrypt};
use super::encoding::base64_bytes;
use super::key::{derive_key, DerivedKey, Salt};
use crate::error::{Result, VaultError};

/// Marker plaintext written by current setups.
pub const VALID_KEY_MARKER: &str = "user_key_set";

/// Marker plaintext written by setups before the current scheme version.
pub const LEGACY_KEY_MARKER: &str = "VALID_KEY_MARKER";

/// Marker plaintext written by the earliest setups, sealed under a 16-byte
/// GCM nonce.
pub const EARLY_KEY_MARKER: &str = "CLIENT_TRACKER_VALIDATION_SUCCESS";

/// Every marker plaintext accepted during validation.
pub const ACCEPTED_MARKERS: &[&str] = &[
    VALID_KEY_MARKER,
    LEGACY_KEY_MARKER,
    EARLY_KEY_MARKER,
];

/// Per-user key metadata persisted by the storage collaborator.
///
/// JSON field names match the profile columns they are stored in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    #[serde(rename = "encryption_key_salt")]
    pub salt: Salt,

    #[serde(rename = "encryption_test_iv", with = "base64_bytes")]
    pub iv: Vec<u8>,

    #[serde(rename = "encrypted_test_data", with = "base64_bytes")]
    pub encrypted_marker: Vec<u8>,
}

impl fmt::Debug for KeyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMetadata")
            .field("salt", &self.salt)
            .field("iv_len", &self.iv.len())
            .field("encrypted_marker_len", &self.encrypted_marker.len())
            .finish()
    }
}

/// Create key metadata for a first-time setup.
///
/// Generates a new salt, derives the key, and encrypts `VALID_KEY_MARKER`
/// under it with a fresh IV. Calling this again for a user that already has
/// metadata would orphan every record sealed under the old salt; callers must
/// go through a store whose `set_key_metadata` refuses overwrites.
pub fn create_validation_marker(passphrase: &str) -> Result<KeyMetadata> {
    let salt = Salt::random()?;
    let key = derive_key(passphrase, &salt)?;
    let sealed = encrypt(VALID_KEY_MARKER, &key)?;

    tracing::debug!("created validation marker");
    Ok(KeyMetadata {
        salt,
        iv: sealed.iv,
        encrypted_marker: sealed.ciphertext,
    })
}

/// Check a passphrase against stored key metadata.
///
/// Returns the derived key only when the marker opens to one of
/// `ACCEPTED_MARKERS`. Every other outcome (wrong passphrase, corrupted
/// marker, malformed IV) is `None`; a mismatch is an expected result, not an
/// error.
pub fn validate_passphrase(
    passphrase: &str,
    salt: &Salt,
    iv: &[u8],
    encrypted_marker: &[u8],
) -> Option<DerivedKey> {
    let key = match derive_key(passphrase, salt) {
        Ok(key) => key,
        Err(err) => {
            tracing::debug!(error = %err, "passphrase rejected before derivation");
            return None;
        }
    };

    match decrypt(encrypted_marker, iv, &key) {
        Ok(text) if ACCEPTED_MARKERS.contains(&text.as_str()) => {
            tracing::debug!(legacy = text != VALID_KEY_MARKER, "passphrase validated");
            Some(key)
        }
        Ok(_) => {
            tracing::debug!("validation marker opened to an unknown value");
            None
        }
        Err(VaultError::Authentication) => {
            tracing::debug!("passphrase did not match validation marker");
            None
        }
        Err(err) => {
            tracing::debug!(error = %err, "validation marker could not be read");
            None
        }
    }
}

/// `validate_passphrase` over a `KeyMetadata` value.
pub fn validate_passphrase_with(passphrase: &str, metadata: &KeyMetadata) -> Option<DerivedKey> {
    validate_passphrase(
        passphrase,
        &metadata.salt,
        &metadata.iv,
        &metadata.encrypted_marker,
    )
}

/// Validate on tokio's blocking pool.
///
/// # Errors
///
/// Only a failed blocking task is an error; a wrong passphrase is `Ok(None)`.
pub async fn validate_passphrase_async(
    passphrase: SecretString,
    metadata: KeyMetadata,
) -> Result<Option<DerivedKey>> {
    tokio::task::spawn_blocking(move || {
        validate_passphrase_with(passphrase.expose_secret(), &metadata)
    })
    .await
    .map_err(|e| VaultError::Crypto(format!("Passphrase validation task failed: {}", e)))
}
