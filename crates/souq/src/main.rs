// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Souq - a self-refreshing storefront.
//!
//! This is the binary entry point: a Telegram bot and a small web front
//! sharing one hot-reloaded configuration.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use souq_config::{ConfigLoader, DEFAULT_OVERRIDE_FILE};

/// Souq - a self-refreshing storefront.
#[derive(Parser, Debug)]
#[command(name = "souq", version, about, long_about = None)]
struct Cli {
    /// Override file read on every configuration reload.
    #[arg(long, global = true, env = "SOUQ_CONFIG", default_value = DEFAULT_OVERRIDE_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the bot and the web server (default).
    Serve,
    /// Load and validate the configuration, then exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let loader = ConfigLoader::new(&cli.config);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(loader).await,
        Commands::Check => check::run_check(&loader),
    };

    if let Err(e) = result {
        eprintln!("souq: {e}");
        std::process::exit(1);
    }
}
