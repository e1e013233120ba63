//! Development tasks for the duel workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod content;

use anyhow::Result;
use clap::Parser;
use commands::{Audit, InspectHero, Replay};

/// Development tasks for the duel workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for duel content and replays", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Check hero data against the custom action registry
    Audit(Audit),

    /// Print a hero's dice, abilities and cards
    InspectHero(InspectHero),

    /// Re-execute a recorded match and print its commitments
    Replay(Replay),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Audit(cmd) => cmd.execute(),
        Command::InspectHero(cmd) => cmd.execute(),
        Command::Replay(cmd) => cmd.execute(),
    }
}
