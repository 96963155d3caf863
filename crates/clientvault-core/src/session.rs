//! Key session: the single owner of a user's derived key.
//!
//! ```text
//! NoKeySet --setup--> KeySetLocked --unlock(ok)--> KeyUnlocked
//!                          ^   |                         |
//!                          |   +--unlock(rejected)--+    |
//!                          |                        |    |
//!                          +------------------------+----+ lock / drop
//! ```
//!
//! There is no transition back to `NoKeySet`: key metadata is never removed.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::crypto::{
    check_passphrase_strength, create_validation_marker, validate_passphrase_async,
    validate_passphrase_with, DerivedKey, EncryptedPayload, KeyMetadata,
};
use crate::error::{Result, VaultError};
use crate::records::{self, EncryptedRecord, OpenedRecord, RecordPayload};
use crate::storage::KeyMetadataStore;

/// Lifecycle state of a user's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    NoKeySet,
    KeySetLocked,
    KeyUnlocked,
}

impl KeyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyState::NoKeySet => "no_key_set",
            KeyState::KeySetLocked => "key_set_locked",
            KeyState::KeyUnlocked => "key_unlocked",
        }
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an unlock attempt. A wrong passphrase is `Rejected`, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    Rejected,
}

/// Owns key metadata and, once unlocked, the derived key for one user.
pub struct KeySession<'a, S: KeyMetadataStore + ?Sized> {
    store: &'a S,
    user_id: String,
    metadata: Option<KeyMetadata>,
    key: Option<DerivedKey>,
}

impl<'a, S: KeyMetadataStore + ?Sized> KeySession<'a, S> {
    /// Load the user's key metadata. The session starts locked.
    pub fn load(store: &'a S, user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(VaultError::InvalidInput("User id cannot be empty".to_string()));
        }
        let metadata = store.get_key_metadata(&user_id)?;

        Ok(Self {
            store,
            user_id,
            metadata,
            key: None,
        })
    }

    pub fn state(&self) -> KeyState {
        match (&self.metadata, &self.key) {
            (None, _) => KeyState::NoKeySet,
            (Some(_), None) => KeyState::KeySetLocked,
            (Some(_), Some(_)) => KeyState::KeyUnlocked,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn metadata(&self) -> Option<&KeyMetadata> {
        self.metadata.as_ref()
    }

    /// First-time key setup.
    ///
    /// Checks passphrase strength, creates the validation marker, and persists
    /// it. The session is left locked; call `unlock` to obtain the key.
    ///
    /// # Errors
    ///
    /// - `VaultError::InvalidInput` if the passphrase fails the strength policy
    /// - `VaultError::Conflict` if a key is already set, either as seen by this
    ///   session or as reported atomically by the store
    pub fn setup(&mut self, passphrase: &str) -> Result<()> {
        if self.metadata.is_some() {
            return Err(VaultError::Conflict(format!(
                "Encryption key already set for user '{}'",
                self.user_id
            )));
        }
        check_passphrase_strength(passphrase)?;

        let metadata = create_validation_marker(passphrase)?;
        self.store.set_key_metadata(&self.user_id, &metadata)?;
        self.metadata = Some(metadata);

        tracing::info!(user_id = %self.user_id, "encryption key set up");
        Ok(())
    }

    /// Validate a passphrase and hold the derived key on success.
    ///
    /// A rejected attempt leaves the current state unchanged.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotSetUp` if the user has no key metadata.
    pub fn unlock(&mut self, passphrase: &str) -> Result<UnlockOutcome> {
        let metadata = self.metadata.as_ref().ok_or(VaultError::NotSetUp)?;
        let key = validate_passphrase_with(passphrase, metadata);
        Ok(self.accept(key))
    }

    pub fn unlock_secret(&mut self, passphrase: &SecretString) -> Result<UnlockOutcome> {
        self.unlock(passphrase.expose_secret())
    }

    /// `unlock` with key derivation on tokio's blocking pool.
    pub async fn unlock_async(&mut self, passphrase: SecretString) -> Result<UnlockOutcome> {
        let metadata = self.metadata.clone().ok_or(VaultError::NotSetUp)?;
        let key = validate_passphrase_async(passphrase, metadata).await?;
        Ok(self.accept(key))
    }

    /// Drop the derived key. Key bytes are zeroized.
    pub fn lock(&mut self) {
        if self.key.take().is_some() {
            tracing::debug!(user_id = %self.user_id, "session locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.key.is_some()
    }

    /// The derived key.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Locked` when no key is held.
    pub fn key(&self) -> Result<&DerivedKey> {
        self.key.as_ref().ok_or(VaultError::Locked)
    }

    pub fn seal<T: RecordPayload>(&self, payload: &T) -> Result<EncryptedPayload> {
        records::seal_record(payload, self.key()?)
    }

    pub fn seal_value(
        &self,
        kind: records::RecordKind,
        value: &serde_json::Value,
    ) -> Result<EncryptedPayload> {
        records::seal_value(kind, value, self.key()?)
    }

    pub fn open<T: RecordPayload>(&self, record: &EncryptedRecord) -> Result<T> {
        records::open_record(record, self.key()?)
    }

    pub fn open_all<T: RecordPayload>(
        &self,
        batch: &[EncryptedRecord],
    ) -> Result<Vec<OpenedRecord<T>>> {
        Ok(records::open_records(batch, self.key()?))
    }

    pub fn open_all_values(
        &self,
        batch: &[EncryptedRecord],
    ) -> Result<Vec<OpenedRecord<serde_json::Value>>> {
        Ok(records::open_records_value(batch, self.key()?))
    }

    fn accept(&mut self, key: Option<DerivedKey>) -> UnlockOutcome {
        match key {
            Some(key) => {
                self.key = Some(key);
                tracing::debug!(user_id = %self.user_id, "session unlocked");
                UnlockOutcome::Unlocked
            }
            None => {
                tracing::debug!(user_id = %self.user_id, "unlock rejected");
                UnlockOutcome::Rejected
            }
        }
    }
}

impl<S: KeyMetadataStore + ?Sized> fmt::Debug for KeySession<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySession")
            .field("user_id", &self.user_id)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ClientData;
    use crate::storage::MemoryKeyStore;

    const PASSPHRASE: &str = "Correct-Horse-1!";

    #[test]
    fn test_new_user_has_no_key() {
        let store = MemoryKeyStore::new();
        let session = KeySession::load(&store, "user_1").unwrap();
        assert_eq!(session.state(), KeyState::NoKeySet);
        assert!(matches!(session.key(), Err(VaultError::Locked)));
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let store = MemoryKeyStore::new();
        assert!(KeySession::load(&store, " ").is_err());
    }

    #[test]
    fn test_unlock_before_setup() {
        let store = MemoryKeyStore::new();
        let mut session = KeySession::load(&store, "user_1").unwrap();
        assert!(matches!(
            session.unlock(PASSPHRASE),
            Err(VaultError::NotSetUp)
        ));
    }

    #[test]
    fn test_setup_rejects_weak_passphrase() {
        let store = MemoryKeyStore::new();
        let mut session = KeySession::load(&store, "user_1").unwrap();

        let err = session.setup("password").unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));
        assert_eq!(session.state(), KeyState::NoKeySet);
        assert!(store.get_key_metadata("user_1").unwrap().is_none());
    }

    #[test]
    fn test_full_lifecycle() {
        let store = MemoryKeyStore::new();
        let mut session = KeySession::load(&store, "user_1").unwrap();

        session.setup(PASSPHRASE).unwrap();
        assert_eq!(session.state(), KeyState::KeySetLocked);
        assert!(matches!(
            session.setup(PASSPHRASE),
            Err(VaultError::Conflict(_))
        ));

        assert_eq!(session.unlock("wrong-pass").unwrap(), UnlockOutcome::Rejected);
        assert_eq!(session.state(), KeyState::KeySetLocked);

        assert_eq!(session.unlock(PASSPHRASE).unwrap(), UnlockOutcome::Unlocked);
        assert_eq!(session.state(), KeyState::KeyUnlocked);

        let sealed = session.seal(&ClientData::new("a@b.com")).unwrap();
        assert_eq!(sealed.iv.len(), 12);

        session.lock();
        assert_eq!(session.state(), KeyState::KeySetLocked);
        assert!(matches!(
            session.seal(&ClientData::new("a@b.com")),
            Err(VaultError::Locked)
        ));
    }

    #[test]
    fn test_rejected_unlock_keeps_existing_key() {
        let store = MemoryKeyStore::new();
        let mut session = KeySession::load(&store, "user_1").unwrap();
        session.setup(PASSPHRASE).unwrap();
        session.unlock(PASSPHRASE).unwrap();

        assert_eq!(session.unlock("wrong-pass").unwrap(), UnlockOutcome::Rejected);
        assert_eq!(session.state(), KeyState::KeyUnlocked);
    }

    #[test]
    fn test_second_session_sees_existing_key() {
        let store = MemoryKeyStore::new();
        KeySession::load(&store, "user_1")
            .unwrap()
            .setup(PASSPHRASE)
            .unwrap();

        let mut session = KeySession::load(&store, "user_1").unwrap();
        assert_eq!(session.state(), KeyState::KeySetLocked);
        assert!(matches!(
            session.setup(PASSPHRASE),
            Err(VaultError::Conflict(_))
        ));
    }

    #[test]
    fn test_stale_session_setup_conflicts_at_store() {
        let store = MemoryKeyStore::new();
        let mut first = KeySession::load(&store, "user_1").unwrap();
        let mut second = KeySession::load(&store, "user_1").unwrap();

        first.setup(PASSPHRASE).unwrap();
        let err = second.setup("Other-Horse-2@").unwrap_err();
        assert!(matches!(err, VaultError::Conflict(_)));
        assert_eq!(second.state(), KeyState::NoKeySet);

        let mut reloaded = KeySession::load(&store, "user_1").unwrap();
        assert_eq!(reloaded.unlock(PASSPHRASE).unwrap(), UnlockOutcome::Unlocked);
    }

    #[test]
    fn test_debug_shows_state_only() {
        let store = MemoryKeyStore::new();
        let session = KeySession::load(&store, "user_1").unwrap();
        let debug_output = format!("{:?}", session);
        assert!(debug_output.contains("NoKeySet"));
    }

    #[tokio::test]
    async fn test_unlock_async() {
        let store = MemoryKeyStore::new();
        let mut session = KeySession::load(&store, "user_1").unwrap();
        session.setup(PASSPHRASE).unwrap();

        let outcome = session
            .unlock_async(SecretString::from(PASSPHRASE.to_string()))
            .await
            .unwrap();
        assert_eq!(outcome, UnlockOutcome::Unlocked);
        assert!(session.is_unlocked());
    }
}
