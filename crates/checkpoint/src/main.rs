// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checkpoint - resilient verification gateway for migrant-services checks.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod check;
mod handlers;
mod serve;
mod server;
mod shutdown;
mod watch;

use std::path::PathBuf;

use checkpoint_config::CheckpointConfig;
use clap::{Parser, Subcommand};

/// Checkpoint - resilient verification gateway.
#[derive(Parser, Debug)]
#[command(name = "checkpoint", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the status and verification endpoints.
    Serve,
    /// Run one verification and print the result as JSON.
    Check {
        /// Domain name: entry_ban, inn, patent, work_permit, residence_permit.
        domain: String,
        /// The query as a JSON object.
        #[arg(long)]
        query: String,
    },
    /// Run the legislation watcher in the foreground.
    Watch {
        /// Poll every source once and exit.
        #[arg(long)]
        once: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&std::path::Path>) -> CheckpointConfig {
    let loaded = match path {
        Some(path) => checkpoint_config::load_and_validate_path(path),
        None => checkpoint_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            checkpoint_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let outcome = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Check { domain, query }) => {
            serve::init_tracing(&config.service.log_level);
            check::run_check(&config, &domain, &query).await
        }
        Some(Commands::Watch { once }) => {
            serve::init_tracing(&config.service.log_level);
            watch::run_watch(&config, once).await
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(checkpoint_core::CheckpointError::Internal(format!(
                "failed to render configuration: {e}"
            ))),
        },
        None => {
            println!("checkpoint: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("checkpoint: {e}");
        std::process::exit(1);
    }
}
