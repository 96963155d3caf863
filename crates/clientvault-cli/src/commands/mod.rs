//! Command handlers.

mod init;
mod key;
mod misc;
mod records;

pub use init::handle_init;
pub use key::{handle_metadata, handle_setup, handle_status, handle_unlock};
pub use misc::handle_completions;
pub use records::{handle_add, handle_delete, handle_edit, handle_list, handle_show};
