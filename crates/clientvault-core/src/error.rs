//! Error types for Client Vault core operations.
//!
//! A wrong passphrase is not an error: validation reports it as `None` or
//! `UnlockOutcome::Rejected`. Everything here is exceptional for the single
//! call that raised it. The CLI layer maps these to user-facing messages and
//! exit codes.

use thiserror::Error;

/// Result type alias for Client Vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for Client Vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Authentication tag did not verify (wrong key, tampered ciphertext or IV)
    #[error("Authentication failed: ciphertext could not be verified with this key")]
    Authentication,

    /// Input has the wrong shape for the cipher (IV length, truncated ciphertext, bad encoding)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Cipher or KDF failure not attributable to the input
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Invalid caller input (empty passphrase, weak passphrase, bad parameters)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record payload validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Key metadata already exists for this user
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No key metadata has been set up for this user
    #[error("Encryption key has not been set up")]
    NotSetUp,

    /// Operation needs an unlocked session
    #[error("Session is locked")]
    Locked,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl VaultError {
    /// Whether this error means "this ciphertext cannot be opened with this key".
    pub fn is_authentication(&self) -> bool {
        matches!(self, VaultError::Authentication)
    }

    /// Whether this error means the input was structurally wrong.
    pub fn is_malformed(&self) -> bool {
        matches!(self, VaultError::MalformedInput(_))
    }
}
