//! Helper functions for the CLI.

mod input;
mod parsing;

pub use input::{
    passphrase_from_env, prompt_passphrase, prompt_setup_passphrase, read_record_data,
};
pub use parsing::{parse_record_id, parse_record_kind};
