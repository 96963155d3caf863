//! Client Vault CLI - zero-knowledge encrypted client records
//!
//! Command-line front end for `clientvault-core`. Records are sealed with a
//! key derived from the user's passphrase; the store only holds ciphertext.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;
mod ui;

use clap::Parser;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::errors::exit_code_for;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code_for(&e));
    }
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => commands::handle_init(ctx, args),
        Some(Commands::Setup(args)) => commands::handle_setup(ctx, args),
        Some(Commands::Unlock(args)) => commands::handle_unlock(ctx, args),
        Some(Commands::Status { json }) => commands::handle_status(ctx, *json),
        Some(Commands::Metadata) => commands::handle_metadata(ctx),
        Some(Commands::Add(args)) => commands::handle_add(ctx, args),
        Some(Commands::Edit(args)) => commands::handle_edit(ctx, args),
        Some(Commands::Show(args)) => commands::handle_show(ctx, args),
        Some(Commands::List(args)) => commands::handle_list(ctx, args),
        Some(Commands::Delete(args)) => commands::handle_delete(ctx, args),
        Some(Commands::Completions { shell }) => commands::handle_completions(*shell),
        None => {
            println!("Client Vault v{}", clientvault_core::VERSION);
            println!("Run 'clientvault --help' for usage information.");
            Ok(())
        }
    }
}
