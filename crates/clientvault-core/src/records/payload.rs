//! Plaintext record payloads.
//!
//! These are serialized to JSON and sealed as a whole; storage never sees any
//! of their fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::RecordKind;
use crate::error::{Result, VaultError};

/// A plaintext payload that can be sealed into a record.
pub trait RecordPayload: Serialize + DeserializeOwned {
    /// Collection this payload is stored in.
    const KIND: RecordKind;

    /// Check required fields before sealing.
    fn validate(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    New,
    Contacted,
    Closed,
}

/// A client (lead or customer) entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClientStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_deck_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ClientData {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// "First Last", falling back to the email address.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

impl RecordPayload for ClientData {
    const KIND: RecordKind = RecordKind::Client;

    fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(VaultError::Validation("Client email is required".to_string()));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(VaultError::Validation(format!(
                "Client email '{}' is not a valid address",
                email
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchDeckData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl RecordPayload for PitchDeckData {
    const KIND: RecordKind = RecordKind::PitchDeck;

    fn validate(&self) -> Result<()> {
        require("Pitch deck title", &self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RecordPayload for StrategyData {
    const KIND: RecordKind = RecordKind::Strategy;

    fn validate(&self) -> Result<()> {
        require("Strategy name", &self.name)
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VaultError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
