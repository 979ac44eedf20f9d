// SPDX-License-Identifier: AGPL-3.0-or-later
//! Arbor CLI
//!
//! Edit a persistent folder tree from the terminal.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::Context;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(author, version, about = "Arbor - folder tree editor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot database path
    #[arg(long, global = true, env = "ARBOR_DB")]
    db: Option<PathBuf>,

    /// Lazy loader to use (see `arbor loaders`)
    #[arg(long, global = true)]
    loader: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tree
    #[command(alias = "tree")]
    Show {
        /// Only print the subtree under this node
        id: Option<String>,
    },

    /// Add a file or folder
    Add {
        /// Folder to add to
        parent: String,

        /// Name of the new entry
        label: String,

        /// Create a folder instead of a file
        #[arg(short, long)]
        folder: bool,
    },

    /// Remove nodes and everything below them
    Rm {
        /// Node id(s) to remove
        #[arg(required = true)]
        ids: Vec<String>,

        /// Remove without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Rename a node
    Rename {
        id: String,
        label: String,
    },

    /// Move a node into another folder
    Mv {
        /// Node to move
        source: String,

        /// Destination folder
        target: String,
    },

    /// Expand a folder, loading its children on first use
    Expand {
        id: String,
    },

    /// Show details for a node
    Find {
        id: String,
    },

    /// Replace the tree with a fresh one
    Reset {
        /// Reset without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Check the stored tree for consistency
    Check,

    /// List lazy loaders
    Loaders,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let ctx = Context { config, db_path: cli.db, loader: cli.loader, verbose: cli.verbose };

    let result = match cli.command {
        Commands::Show { id } => commands::show(&ctx, id.as_deref()).await,
        Commands::Add { parent, label, folder } => {
            commands::add(&ctx, &parent, &label, folder).await
        }
        Commands::Rm { ids, force } => commands::rm(&ctx, &ids, force).await,
        Commands::Rename { id, label } => commands::rename(&ctx, &id, &label).await,
        Commands::Mv { source, target } => commands::mv(&ctx, &source, &target).await,
        Commands::Expand { id } => commands::expand(&ctx, &id).await,
        Commands::Find { id } => commands::find(&ctx, &id).await,
        Commands::Reset { force } => commands::reset(&ctx, force).await,
        Commands::Check => commands::check(&ctx).await,
        Commands::Loaders => commands::loaders(&ctx).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
