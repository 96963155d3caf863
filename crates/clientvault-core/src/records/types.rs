//! Stored record envelope types.
//!
//! These types are what storage sees: opaque ciphertext plus the columns it
//! needs to scope and order rows. Plaintext payloads live in `payload`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::EncryptedPayload;
use crate::error::{Result, VaultError};

/// Which collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Client,
    PitchDeck,
    Strategy,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Client,
        RecordKind::PitchDeck,
        RecordKind::Strategy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Client => "client",
            RecordKind::PitchDeck => "pitch_deck",
            RecordKind::Strategy => "strategy",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "client" | "clients" => Ok(RecordKind::Client),
            "pitch_deck" | "pitch_decks" => Ok(RecordKind::PitchDeck),
            "strategy" | "strategies" => Ok(RecordKind::Strategy),
            other => Err(VaultError::InvalidInput(format!(
                "Unknown record kind '{}' (expected client, pitch_deck or strategy)",
                other
            ))),
        }
    }
}

/// A sealed record as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    pub id: Uuid,

    /// Owner; every store operation is scoped by it
    pub user_id: String,

    pub kind: RecordKind,

    /// `encrypted_data` and `iv` on the wire
    #[serde(flatten)]
    pub payload: EncryptedPayload,

    /// Per-record salt written by old clients. Read for display, never written.
    #[serde(rename = "salt", default, skip_serializing_if = "Option::is_none")]
    pub legacy_salt: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EncryptedRecord {
    /// Check IV and ciphertext lengths before attempting decryption.
    pub fn check_shape(&self) -> Result<()> {
        self.payload.check_shape()
    }
}

/// A record about to be inserted.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub user_id: String,
    pub kind: RecordKind,
    pub payload: EncryptedPayload,
}

impl NewRecord {
    pub fn new(user_id: impl Into<String>, kind: RecordKind, payload: EncryptedPayload) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_and_display() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!("pitch-deck".parse::<RecordKind>().unwrap(), RecordKind::PitchDeck);
        assert_eq!("Strategies".parse::<RecordKind>().unwrap(), RecordKind::Strategy);
        assert!("journal".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_kind_serde_snake_case() {
        let json = serde_json::to_string(&RecordKind::PitchDeck).unwrap();
        assert_eq!(json, "\"pitch_deck\"");
    }

    #[test]
    fn test_record_json_shape() {
        let record = EncryptedRecord {
            id: Uuid::nil(),
            user_id: "user_1".to_string(),
            kind: RecordKind::Client,
            payload: EncryptedPayload {
                ciphertext: b"marker".to_vec(),
                iv: vec![0u8; 12],
            },
            legacy_salt: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["encrypted_data"], "bWFya2Vy");
        assert_eq!(json["iv"], "AAAAAAAAAAAAAAAA");
        assert_eq!(json["kind"], "client");
        assert!(json.get("salt").is_none());

        let back: EncryptedRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_reads_legacy_salt() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "user_id": "user_1",
            "kind": "strategy",
            "encrypted_data": "bWFya2Vy",
            "iv": "AAAAAAAAAAAAAAAAAAAAAA==",
            "salt": "c2FsdA==",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        });

        let record: EncryptedRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.legacy_salt.as_deref(), Some("c2FsdA=="));
        assert!(record.check_shape().unwrap_err().is_malformed());
    }
}
