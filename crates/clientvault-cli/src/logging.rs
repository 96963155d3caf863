//! Diagnostic logging.
//!
//! Log lines go to stderr so stdout stays clean for `--json` output. The
//! filter comes from `CLIENTVAULT_LOG` and defaults to warnings only.

use tracing_subscriber::EnvFilter;

use crate::constants::LOG_ENV;

pub fn init(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
