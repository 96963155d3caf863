//! In-memory key metadata store for embedding and tests.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::crypto::KeyMetadata;
use crate::error::{Result, VaultError};
use crate::storage::traits::KeyMetadataStore;

#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    entries: Mutex<HashMap<String, KeyMetadata>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, HashMap<String, KeyMetadata>>> {
        self.entries
            .lock()
            .map_err(|_| VaultError::Storage("Key metadata map poisoned".to_string()))
    }
}

impl KeyMetadataStore for MemoryKeyStore {
    fn get_key_metadata(&self, user_id: &str) -> Result<Option<KeyMetadata>> {
        Ok(self.lock_entries()?.get(user_id).cloned())
    }

    fn set_key_metadata(&self, user_id: &str, metadata: &KeyMetadata) -> Result<()> {
        match self.lock_entries()?.entry(user_id.to_string()) {
            Entry::Occupied(_) => Err(VaultError::Conflict(format!(
                "Encryption key already set for user '{}'",
                user_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(metadata.clone());
                Ok(())
            }
        }
    }
}
