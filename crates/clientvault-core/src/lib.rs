//! # Client Vault Core
//!
//! Core library for Client Vault - zero-knowledge encryption for CRM records.
//!
//! Every sensitive record field is sealed with a key derived from the user's
//! passphrase before it reaches storage. Storage only ever holds the salt, a
//! validation marker, and opaque ciphertext.
//!
//! ## Architecture
//!
//! - **crypto**: Key derivation, AES-256-GCM, validation marker, passphrase policy
//! - **session**: Lock/unlock lifecycle for the in-memory derived key
//! - **records**: Typed client, pitch deck and strategy payloads, sealed per record
//! - **storage**: Key metadata and record store traits, SQLite and in-memory backends

pub mod crypto;
pub mod error;
pub mod records;
pub mod session;
pub mod storage;

pub use crypto::{DerivedKey, EncryptedPayload, KdfParams, KeyMetadata, Salt};
pub use error::{Result, VaultError};
pub use records::{EncryptedRecord, NewRecord, OpenedRecord, RecordKind, RecordOutcome};
pub use session::{KeySession, KeyState, UnlockOutcome};
pub use storage::{KeyMetadataStore, MemoryKeyStore, RecordStore, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
