//! AES-256-GCM encryption for record payloads and the validation marker.
//!
//! Every call to `encrypt` draws a fresh 12-byte IV from the OS CSPRNG. The
//! IV is returned next to the ciphertext (which carries the 16-byte tag at its
//! end) so the caller can persist both. Decryption also accepts the 16-byte
//! GCM nonces written by earlier setups.

use std::fmt;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{Aes256Gcm, AesGcm, Nonce};
use serde::{Deserialize, Serialize};

use super::encoding::base64_bytes;
use super::key::DerivedKey;
use super::random_bytes;
use crate::error::{Result, VaultError};

/// IV (nonce) length required by AES-GCM, in bytes.
pub const IV_SIZE: usize = 12;

/// Longer GCM nonce found on markers and records from earlier setups.
/// Only ever read, never written.
pub const LEGACY_IV_SIZE: usize = 16;

type LegacyAes256Gcm = AesGcm<Aes256, U16>;

/// Authentication tag length appended to every ciphertext, in bytes.
pub const TAG_SIZE: usize = 16;

/// Ciphertext plus the IV it was produced with.
///
/// Serializes with the column names records use on the wire:
/// `{"encrypted_data": "<base64>", "iv": "<base64>"}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    #[serde(rename = "encrypted_data", with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub iv: Vec<u8>,
}

impl EncryptedPayload {
    /// Decrypt this payload back to a string.
    pub fn decrypt(&self, key: &DerivedKey) -> Result<String> {
        decrypt(&self.ciphertext, &self.iv, key)
    }

    /// Check IV and ciphertext lengths without touching the key.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::MalformedInput` if the IV is neither `IV_SIZE` nor
    /// `LEGACY_IV_SIZE` bytes, or
    /// the ciphertext is too short to hold the authentication tag.
    pub fn check_shape(&self) -> Result<()> {
        check_shape(&self.ciphertext, &self.iv)
    }
}

impl fmt::Debug for EncryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedPayload")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

/// Encrypt a UTF-8 string under `key`.
///
/// # Examples
///
/// ```no_run
/// use clientvault_core::crypto::{decrypt, derive_key, encrypt, Salt};
///
/// let key = derive_key("Correct-Horse-1!", &Salt::random().unwrap()).unwrap();
/// let sealed = encrypt(r#"{"email":"a@b.com"}"#, &key).unwrap();
/// let opened = decrypt(&sealed.ciphertext, &sealed.iv, &key).unwrap();
/// assert_eq!(opened, r#"{"email":"a@b.com"}"#);
/// ```
pub fn encrypt(plaintext: &str, key: &DerivedKey) -> Result<EncryptedPayload> {
    encrypt_bytes(plaintext.as_bytes(), key)
}

/// Encrypt raw bytes under `key` with a fresh random IV.
pub fn encrypt_bytes(plaintext: &[u8], key: &DerivedKey) -> Result<EncryptedPayload> {
    let cipher = cipher_for(key)?;
    let iv: [u8; IV_SIZE] = random_bytes()?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| VaultError::Crypto("AES-GCM encryption failed".to_string()))?;

    Ok(EncryptedPayload {
        ciphertext,
        iv: iv.to_vec(),
    })
}

/// Decrypt ciphertext to a UTF-8 string.
///
/// # Errors
///
/// - `VaultError::MalformedInput` if the IV or ciphertext length is wrong, or
///   the authenticated plaintext is not UTF-8
/// - `VaultError::Authentication` if the tag does not verify (wrong key,
///   tampered ciphertext, tampered IV)
pub fn decrypt(ciphertext: &[u8], iv: &[u8], key: &DerivedKey) -> Result<String> {
    let plaintext = decrypt_bytes(ciphertext, iv, key)?;
    String::from_utf8(plaintext).map_err(|_| {
        VaultError::MalformedInput("Decrypted payload is not valid UTF-8".to_string())
    })
}

/// Decrypt ciphertext to raw bytes.
pub fn decrypt_bytes(ciphertext: &[u8], iv: &[u8], key: &DerivedKey) -> Result<Vec<u8>> {
    check_shape(ciphertext, iv)?;

    let opened = if iv.len() == LEGACY_IV_SIZE {
        legacy_cipher_for(key)?.decrypt(Nonce::from_slice(iv), ciphertext)
    } else {
        cipher_for(key)?.decrypt(Nonce::from_slice(iv), ciphertext)
    };
    opened.map_err(|_| VaultError::Authentication)
}

fn check_shape(ciphertext: &[u8], iv: &[u8]) -> Result<()> {
    if iv.len() != IV_SIZE && iv.len() != LEGACY_IV_SIZE {
        return Err(VaultError::MalformedInput(format!(
            "IV must be {} or {} bytes (got {})",
            IV_SIZE,
            LEGACY_IV_SIZE,
            iv.len()
        )));
    }
    if ciphertext.len() < TAG_SIZE {
        return Err(VaultError::MalformedInput(format!(
            "Ciphertext must be at least {} bytes (got {})",
            TAG_SIZE,
            ciphertext.len()
        )));
    }
    Ok(())
}

fn cipher_for(key: &DerivedKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Invalid AES key: {}", e)))
}

fn legacy_cipher_for(key: &DerivedKey) -> Result<LegacyAes256Gcm> {
    LegacyAes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Invalid AES key: {}", e)))
}
