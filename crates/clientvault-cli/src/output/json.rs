//! JSON output formatting for records and key status.

use clientvault_core::{KeyState, OpenedRecord, RecordKind};

/// Convert an opened record to JSON for output.
///
/// Failed records carry `"decrypted_data": {"error": "..."}`.
pub fn record_json(record: &OpenedRecord<serde_json::Value>) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(record)?)
}

pub fn records_json(
    records: &[OpenedRecord<serde_json::Value>],
) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(records)?)
}

pub fn status_json(
    user_id: &str,
    state: KeyState,
    counts: &[(RecordKind, usize)],
) -> serde_json::Value {
    let records: serde_json::Map<String, serde_json::Value> = counts
        .iter()
        .map(|(kind, count)| (kind.as_str().to_string(), serde_json::json!(count)))
        .collect();
    serde_json::json!({
        "user_id": user_id,
        "state": state,
        "has_encryption_key": state != KeyState::NoKeySet,
        "records": records,
    })
}
