//! Text and table output formatting for records.

use comfy_table::{presets, ContentArrangement, Table};

use clientvault_core::{OpenedRecord, RecordKind};

const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One-line summary of a decrypted record's fields.
pub fn record_summary(kind: RecordKind, data: &serde_json::Value) -> String {
    let field = |name: &str| {
        data.get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    match kind {
        RecordKind::Client => {
            let name = [field("first_name"), field("last_name")]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            let email = field("email").unwrap_or("");
            match (name.is_empty(), field("company")) {
                (true, _) => email.to_string(),
                (false, Some(company)) => format!("{} <{}> ({})", name, email, company),
                (false, None) => format!("{} <{}>", name, email),
            }
        }
        RecordKind::PitchDeck => field("title").unwrap_or("").to_string(),
        RecordKind::Strategy => field("name").unwrap_or("").to_string(),
    }
}

fn summary_cell(record: &OpenedRecord<serde_json::Value>) -> String {
    match (record.data(), record.error()) {
        (Some(data), _) => record_summary(record.kind, data),
        (None, Some(error)) => format!("[undecryptable: {}]", error),
        (None, None) => String::new(),
    }
}

pub fn render_record_list(records: &[OpenedRecord<serde_json::Value>]) -> String {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "KIND", "CREATED", "SUMMARY"]);

    for record in records {
        table.add_row(vec![
            record.id.to_string(),
            record.kind.to_string(),
            record.created_at.format(CREATED_FORMAT).to_string(),
            summary_cell(record),
        ]);
    }

    table.to_string()
}

pub fn print_record_list(records: &[OpenedRecord<serde_json::Value>]) {
    if records.is_empty() {
        println!("No records found.");
        return;
    }
    println!("{}", render_record_list(records));
}

/// Print a single record's metadata and fields.
pub fn print_record(record: &OpenedRecord<serde_json::Value>) {
    println!("ID: {}", record.id);
    println!("Kind: {}", record.kind);
    println!("Created: {}", record.created_at.to_rfc3339());
    println!("Updated: {}", record.updated_at.to_rfc3339());
    println!();

    match (record.data(), record.error()) {
        (Some(serde_json::Value::Object(fields)), _) => {
            for (name, value) in fields {
                match value {
                    serde_json::Value::String(text) => println!("{}: {}", name, text),
                    serde_json::Value::Null => {}
                    other => println!("{}: {}", name, other),
                }
            }
        }
        (Some(other), _) => println!("{}", other),
        (None, Some(error)) => println!("[undecryptable: {}]", error),
        (None, None) => {}
    }
}
