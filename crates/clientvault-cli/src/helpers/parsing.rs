//! Argument parsing helpers.

use clientvault_core::RecordKind;
use uuid::Uuid;

use crate::errors::CliError;

pub fn parse_record_id(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| CliError::invalid_input(format!("Invalid record ID: {}", value)).into())
}

pub fn parse_record_kind(value: &str) -> anyhow::Result<RecordKind> {
    value.parse::<RecordKind>().map_err(|_| {
        let known = RecordKind::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        CliError::invalid_input(format!(
            "Unknown record kind '{}'. Expected one of: {}",
            value, known
        ))
        .into()
    })
}
