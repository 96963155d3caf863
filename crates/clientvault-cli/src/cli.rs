use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use clientvault_core::VERSION;

/// Client Vault - zero-knowledge encrypted client records
#[derive(Parser)]
#[command(name = "clientvault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the store file
    #[arg(short, long, global = true, env = "CLIENTVAULT_STORE")]
    pub store: Option<String>,

    /// User whose key and records to use
    #[arg(short, long, global = true, env = "CLIENTVAULT_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the store will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments shared by commands that read a passphrase
#[derive(Args)]
pub struct PassphraseArgs {
    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Record kind (client, pitch_deck, strategy)
    #[arg(value_name = "KIND")]
    pub kind: String,

    /// Record fields as a JSON object (overrides stdin)
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Record ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Replacement fields as a JSON object (overrides stdin)
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Record ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Filter by record kind
    #[arg(value_name = "KIND")]
    pub kind: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Record ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new store and write the config file
    Init(InitArgs),

    /// Set up the encryption key for a user (one time only)
    Setup(PassphraseArgs),

    /// Check a passphrase against the stored key
    Unlock(PassphraseArgs),

    /// Show whether a key is set up, with record counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the stored key metadata (salt and validation marker) as JSON
    Metadata,

    /// Encrypt and store a new record
    Add(AddArgs),

    /// Replace a record's contents
    Edit(EditArgs),

    /// Decrypt and show a record
    Show(ShowArgs),

    /// Decrypt and list records
    List(ListArgs),

    /// Delete a record
    Delete(DeleteArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}
