//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! This module derives a 256-bit AES-GCM key from a passphrase and a per-user
//! random salt. The iteration count is deliberately high so that each guess
//! costs an offline attacker the same hundreds of milliseconds it costs us.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use super::{encoding, random_bytes};
use crate::error::{Result, VaultError};

/// PBKDF2 iteration count used for every stored key.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Lowest iteration count accepted by `KdfParams`.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
pub const KEY_SIZE: usize = 32;

/// Length of the per-user salt in bytes.
pub const SALT_SIZE: usize = 16;

/// PBKDF2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    iterations: u32,
}

impl KdfParams {
    /// Create parameters with a custom iteration count.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` if `iterations` is below `MIN_ITERATIONS`.
    pub fn new(iterations: u32) -> Result<Self> {
        if iterations < MIN_ITERATIONS {
            return Err(VaultError::InvalidInput(format!(
                "KDF iterations must be at least {} (got {})",
                MIN_ITERATIONS, iterations
            )));
        }
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Random per-user key derivation salt.
///
/// Generated once at key setup and never regenerated: a new salt derives a
/// different key and orphans everything sealed under the old one.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generate a fresh salt from the OS CSPRNG.
    pub fn random() -> Result<Self> {
        Ok(Self(random_bytes()?))
    }

    /// Build a salt from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::MalformedInput` unless exactly `SALT_SIZE` bytes are given.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SALT_SIZE] = bytes.try_into().map_err(|_| {
            VaultError::MalformedInput(format!(
                "Salt must be {} bytes (got {})",
                SALT_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Parse a Base64-encoded salt.
    pub fn from_base64(text: &str) -> Result<Self> {
        Self::from_slice(&encoding::decode(text)?)
    }

    pub fn to_base64(&self) -> String {
        encoding::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

impl From<[u8; SALT_SIZE]> for Salt {
    fn from(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Salt").field(&self.to_base64()).finish()
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Salt::from_base64(&text).map_err(serde::de::Error::custom)
    }
}

/// A cryptographic key derived from a passphrase.
///
/// This type ensures that key material is securely zeroized from memory
/// when dropped, reducing the window of exposure. It is never serialized.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Create a new DerivedKey from raw bytes.
    ///
    /// # Security
    ///
    /// The caller is responsible for ensuring the bytes come from a secure source.
    pub(crate) fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a passphrase with the default parameters.
///
/// # Security
///
/// - Same passphrase + salt always produces the same key (deterministic)
/// - Different salt produces a different key (salt must be stored per user)
/// - Cost is fixed by the iteration count, whether or not the passphrase is right
///
/// # Examples
///
/// ```
/// use clientvault_core::crypto::{derive_key, Salt};
///
/// let salt = Salt::from([7u8; 16]);
/// let key = derive_key("Correct-Horse-1!", &salt).unwrap();
/// assert_eq!(key.as_bytes().len(), 32);
/// ```
pub fn derive_key(passphrase: &str, salt: &Salt) -> Result<DerivedKey> {
    derive_key_with_params(passphrase, salt, &KdfParams::default())
}

/// Derive an encryption key from a passphrase with explicit parameters.
///
/// # Errors
///
/// Returns `VaultError::InvalidInput` for an empty passphrase.
pub fn derive_key_with_params(
    passphrase: &str,
    salt: &Salt,
    params: &KdfParams,
) -> Result<DerivedKey> {
    if passphrase.is_empty() {
        return Err(VaultError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    tracing::debug!(iterations = params.iterations, "deriving key");
    let key = pbkdf2_sha256(passphrase.as_bytes(), salt.as_bytes(), params.iterations);
    Ok(DerivedKey::from_bytes(key))
}

/// Derive a key on tokio's blocking pool.
///
/// Dropping the returned future abandons the derivation result; nothing is
/// left half-written because derivation has no side effects.
pub async fn derive_key_async(passphrase: SecretString, salt: Salt) -> Result<DerivedKey> {
    tokio::task::spawn_blocking(move || derive_key(passphrase.expose_secret(), &salt))
        .await
        .map_err(|e| VaultError::Crypto(format!("Key derivation task failed: {}", e)))?
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    key
}
