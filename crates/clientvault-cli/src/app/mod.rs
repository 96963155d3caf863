//! Application-level utilities for the Client Vault CLI.
//!
//! This module provides:
//! - Store path and user resolution
//! - Lazy config loading
//! - Passphrase handling with retry logic

mod context;
mod resolver;
mod unlock;

pub use context::AppContext;
pub use resolver::{missing_key_hint, resolve_config_path};
