//! Cryptographic operations for Client Vault.
//!
//! This module provides key derivation and authenticated encryption using
//! well-audited RustCrypto implementations:
//! - **PBKDF2-HMAC-SHA256**: 600,000 iterations, 256-bit output
//! - **AES-256-GCM**: authenticated encryption with a fresh 96-bit IV per call
//!
//! ## Security Model
//!
//! - The passphrase and the derived key never leave the client
//! - Storage holds a per-user random salt and a validation marker
//! - A passphrase is checked by re-deriving the key and opening the marker
//! - Key material is zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft or inspection of the storage backend
//! - Offline brute-force attacks on the passphrase
//! - Tampering with stored ciphertext or IVs
//!
//! We do NOT defend against:
//! - Compromised client / keylogger
//! - Access to an unlocked session or its memory
//! - A lost passphrase (data is unrecoverable)

pub mod cipher;
pub mod encoding;
pub mod key;
pub mod marker;
pub mod passphrase;

pub use cipher::{
    decrypt, decrypt_bytes, encrypt, encrypt_bytes, EncryptedPayload, IV_SIZE, TAG_SIZE,
};
pub use key::{
    derive_key, derive_key_async, derive_key_with_params, DerivedKey, KdfParams, Salt,
    DEFAULT_ITERATIONS, KEY_SIZE, MIN_ITERATIONS, SALT_SIZE,
};
pub use marker::{
    create_validation_marker, validate_passphrase, validate_passphrase_async,
    validate_passphrase_with, KeyMetadata, ACCEPTED_MARKERS, EARLY_KEY_MARKER, LEGACY_KEY_MARKER,
    VALID_KEY_MARKER,
};
pub use passphrase::check_passphrase_strength;

use crate::error::{Result, VaultError};

/// Fill a fixed-size buffer from the operating system CSPRNG.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| VaultError::Crypto(format!("Random number generation failed: {}", e)))?;
    Ok(bytes)
}
