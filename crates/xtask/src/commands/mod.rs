//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod audit;
mod inspect_hero;
mod replay;

pub use audit::Audit;
pub use inspect_hero::InspectHero;
pub use replay::Replay;

/// Output format shared by the inspection commands.
#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}
