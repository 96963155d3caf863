//! Output formatting helpers for the CLI.
//!
//! Records can be shown as JSON or as a table/plain text.

mod json;
mod text;

pub use json::{record_json, records_json, status_json};
pub use text::{print_record, print_record_list};
