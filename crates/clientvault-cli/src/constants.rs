//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, and by clap for usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, store, key metadata, record).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase, too many attempts, undecryptable record).
    pub const AUTH_FAILED: i32 = 5;

    /// Encryption key already set up for this user.
    pub const CONFLICT: i32 = 6;
}

/// Environment variable holding the passphrase for non-interactive use.
pub const PASSPHRASE_ENV: &str = "CLIENTVAULT_PASSPHRASE";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "CLIENTVAULT_CONFIG";

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "CLIENTVAULT_LOG";

/// Interactive unlock attempts when the config does not say otherwise.
pub const DEFAULT_UNLOCK_ATTEMPTS: u32 = 3;
