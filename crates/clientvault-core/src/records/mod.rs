//! Record sealing and batch opening.
//!
//! A record's plaintext is its payload serialized as JSON. Sealing validates
//! the payload and encrypts it under the session key; opening reverses that.
//! Batch opening never aborts: each record either decrypts or is reported as
//! undecryptable next to its id.

pub mod payload;
pub mod types;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::crypto::{encrypt, DerivedKey, EncryptedPayload};
use crate::error::{Result, VaultError};

pub use payload::{
    ClientData, ClientStatus, PitchDeckData, Priority, RecordPayload, StrategyData,
};
pub use types::{EncryptedRecord, NewRecord, RecordKind};

/// Outcome of opening one record in a batch.
///
/// Serializes as the payload itself or as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordOutcome<T> {
    Decrypted(T),
    Undecryptable { error: String },
}

/// A record from a batch, opened or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenedRecord<T> {
    pub id: Uuid,
    pub kind: RecordKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "decrypted_data")]
    pub outcome: RecordOutcome<T>,
}

impl<T> OpenedRecord<T> {
    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            RecordOutcome::Decrypted(data) => Some(data),
            RecordOutcome::Undecryptable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RecordOutcome::Decrypted(_) => None,
            RecordOutcome::Undecryptable { error } => Some(error),
        }
    }

    pub fn is_decrypted(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Decrypted(_))
    }
}

/// Validate and seal a typed payload.
pub fn seal_record<T: RecordPayload>(payload: &T, key: &DerivedKey) -> Result<EncryptedPayload> {
    payload.validate()?;
    let plaintext = serde_json::to_string(payload)?;
    encrypt(&plaintext, key)
}

/// Seal an untyped JSON payload after checking it against `kind`'s schema.
///
/// The JSON is re-serialized from the typed form, so unknown fields are
/// dropped before encryption.
pub fn seal_value(
    kind: RecordKind,
    value: &serde_json::Value,
    key: &DerivedKey,
) -> Result<EncryptedPayload> {
    match kind {
        RecordKind::Client => seal_record(&typed::<ClientData>(kind, value)?, key),
        RecordKind::PitchDeck => seal_record(&typed::<PitchDeckData>(kind, value)?, key),
        RecordKind::Strategy => seal_record(&typed::<StrategyData>(kind, value)?, key),
    }
}

/// Open a single record as `T`.
///
/// # Errors
///
/// - `VaultError::Validation` if the record is not of `T`'s kind
/// - `VaultError::MalformedInput` for a bad IV, truncated ciphertext, or a
///   plaintext that is not a valid payload
/// - `VaultError::Authentication` if the key does not open the record
pub fn open_record<T: RecordPayload>(record: &EncryptedRecord, key: &DerivedKey) -> Result<T> {
    if record.kind != T::KIND {
        return Err(VaultError::Validation(format!(
            "Record {} is a {}, expected {}",
            record.id,
            record.kind,
            T::KIND
        )));
    }
    let plaintext = record.payload.decrypt(key)?;
    serde_json::from_str(&plaintext).map_err(|e| {
        VaultError::MalformedInput(format!(
            "Record {} is not valid {} data: {}",
            record.id,
            T::KIND,
            e
        ))
    })
}

/// Open a single record of any kind as raw JSON.
pub fn open_record_value(record: &EncryptedRecord, key: &DerivedKey) -> Result<serde_json::Value> {
    let plaintext = record.payload.decrypt(key)?;
    serde_json::from_str(&plaintext).map_err(|e| {
        VaultError::MalformedInput(format!("Record {} is not valid JSON: {}", record.id, e))
    })
}

/// Open every record in `records` as `T`, capturing failures per record.
pub fn open_records<T: RecordPayload>(
    records: &[EncryptedRecord],
    key: &DerivedKey,
) -> Vec<OpenedRecord<T>> {
    open_batch(records, |record| open_record::<T>(record, key))
}

/// Open a mixed-kind batch as raw JSON, capturing failures per record.
pub fn open_records_value(
    records: &[EncryptedRecord],
    key: &DerivedKey,
) -> Vec<OpenedRecord<serde_json::Value>> {
    open_batch(records, |record| open_record_value(record, key))
}

fn open_batch<T, F>(records: &[EncryptedRecord], open: F) -> Vec<OpenedRecord<T>>
where
    F: Fn(&EncryptedRecord) -> Result<T>,
{
    records
        .iter()
        .map(|record| {
            let outcome = match record.check_shape().and_then(|()| open(record)) {
                Ok(data) => RecordOutcome::Decrypted(data),
                Err(err) => {
                    tracing::warn!(
                        record_id = %record.id,
                        kind = %record.kind,
                        error = %err,
                        "record could not be decrypted"
                    );
                    RecordOutcome::Undecryptable {
                        error: err.to_string(),
                    }
                }
            };
            OpenedRecord {
                id: record.id,
                kind: record.kind,
                created_at: record.created_at,
                updated_at: record.updated_at,
                outcome,
            }
        })
        .collect()
}

fn typed<T: RecordPayload>(kind: RecordKind, value: &serde_json::Value) -> Result<T> {
    T::deserialize(value)
        .map_err(|e| VaultError::Validation(format!("Invalid {} data: {}", kind, e)))
}
