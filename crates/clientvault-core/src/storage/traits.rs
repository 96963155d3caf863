//! Storage collaborator traits.
//!
//! The encryption core consumes exactly two storage capabilities: reading and
//! writing per-user key metadata. Record storage is separate; it only ever
//! handles opaque ciphertext and never sees plaintext or keys.

use uuid::Uuid;

use crate::crypto::{EncryptedPayload, KeyMetadata};
use crate::error::Result;
use crate::records::{EncryptedRecord, NewRecord, RecordKind};

/// Per-user key metadata (salt plus validation marker).
///
/// All implementations must ensure:
/// - Metadata is written once per user and never overwritten
/// - The write-once check is atomic with the write itself
pub trait KeyMetadataStore: Send + Sync {
    /// Get key metadata for a user.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the user has not set up a key.
    fn get_key_metadata(&self, user_id: &str) -> Result<Option<KeyMetadata>>;

    /// Persist key metadata for a user.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Conflict` if metadata already exists for `user_id`.
    /// Two concurrent first-time setups for one user must never both succeed.
    fn set_key_metadata(&self, user_id: &str, metadata: &KeyMetadata) -> Result<()>;
}

/// Encrypted record storage, scoped by owner.
///
/// Every operation takes the owning `user_id`; a record owned by someone else
/// behaves exactly like a missing one.
pub trait RecordStore: Send + Sync {
    /// Insert a new record.
    ///
    /// # Returns
    ///
    /// Returns the UUID of the created record.
    fn insert_record(&self, record: &NewRecord) -> Result<Uuid>;

    /// Replace a record's ciphertext and IV, bumping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if no such record exists for `user_id`.
    fn update_record(&self, user_id: &str, id: &Uuid, payload: &EncryptedPayload) -> Result<()>;

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if no such record exists for `user_id`.
    fn delete_record(&self, user_id: &str, id: &Uuid) -> Result<()>;

    /// Get a record by ID.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(record))` if found, `Ok(None)` if not found.
    fn get_record(&self, user_id: &str, id: &Uuid) -> Result<Option<EncryptedRecord>>;

    /// List a user's records, optionally restricted to one kind.
    ///
    /// Records are returned in reverse chronological order (newest first).
    fn list_records(&self, user_id: &str, kind: Option<RecordKind>)
        -> Result<Vec<EncryptedRecord>>;
}
