//! Record row type for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crypto::{encoding, EncryptedPayload};
use crate::error::{Result, VaultError};
use crate::records::{EncryptedRecord, RecordKind};

/// Column list matching `RecordRow::from_row`.
pub(super) const RECORD_COLUMNS: &str =
    "id, user_id, kind, encrypted_data, iv, salt, created_at, updated_at";

/// Raw row data from the records table, before parsing into domain types.
#[derive(Debug)]
pub(super) struct RecordRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub encrypted_data: String,
    pub iv: String,
    pub salt: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl RecordRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: row.get(2)?,
            encrypted_data: row.get(3)?,
            iv: row.get(4)?,
            salt: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<RecordRow> for EncryptedRecord {
    type Error = VaultError;

    fn try_from(row: RecordRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| VaultError::Storage(format!("Invalid record UUID: {}", e)))?;
        let kind: RecordKind = row
            .kind
            .parse()
            .map_err(|e| VaultError::Storage(format!("Invalid record kind: {}", e)))?;
        let created_at = parse_timestamp(&row.created_at)?;
        let updated_at = parse_timestamp(&row.updated_at)?;

        // Undecodable bytes surface as an undecryptable record, not a failed read.
        let payload = EncryptedPayload {
            ciphertext: lenient_decode(&row.id, "encrypted_data", &row.encrypted_data),
            iv: lenient_decode(&row.id, "iv", &row.iv),
        };

        Ok(EncryptedRecord {
            id,
            user_id: row.user_id,
            kind,
            payload,
            legacy_salt: row.salt,
            created_at,
            updated_at,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| VaultError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

fn lenient_decode(record_id: &str, column: &str, value: &str) -> Vec<u8> {
    match encoding::decode(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(record_id, column, error = %err, "stored column is not valid Base64");
            Vec::new()
        }
    }
}
