//! Vigil codegen - build-time tooling for the policy packs
//!
//! Two batch subcommands:
//! - `new-policy` scaffolds a policy module and wires it into its pack
//! - `bundle` merges policy modules from several packs, renaming colliding
//!   top-level symbols
//!
//! Both run offline against the source tree and share no state with the
//! registry core.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod bundle;
mod error;
mod scaffold;

/// Vigil codegen CLI
#[derive(Parser)]
#[command(name = "vigil-codegen")]
#[command(about = "Scaffold and bundle Vigil policy packs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new policy module
    NewPolicy(scaffold::NewPolicyArgs),

    /// Merge policy modules from several packs into one module tree
    Bundle(bundle::BundleArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::NewPolicy(args) => scaffold::run(&args)?,
        Commands::Bundle(args) => bundle::run(&args)?,
    }
    Ok(())
}
