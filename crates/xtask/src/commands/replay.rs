//! Re-execute a recorded match from a JSON replay log.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use duel_content::builtin_registry;
use duel_core::{
    GameEnv, MatchState, PlayerId, ReplayLog, compute_commands_root, replay, state_root,
};

use super::OutputFormat;
use crate::content;

/// Re-execute a recorded match and print its commitments
#[derive(Parser)]
pub struct Replay {
    /// Replay log (JSON-encoded seed, heroes and commands)
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Data directory (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Print every domain event
    #[arg(short, long)]
    events: bool,

    /// Output format for the final state
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Replay {
    pub fn execute(self) -> Result<()> {
        let text = std::fs::read_to_string(&self.log)
            .with_context(|| format!("Failed to read replay log: {}", self.log.display()))?;
        let log: ReplayLog = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse replay log: {}", self.log.display()))?;

        let content = content::load(self.data_dir.as_deref())?;
        let tables = content.tables().context("Invalid hero definitions")?;
        let registry = builtin_registry()?;
        let env = GameEnv::from_parts(&tables, &content.rules, &registry);

        let outcome = replay(env, &log).context("Replay diverged from the rules")?;
        let commands_root =
            compute_commands_root(&log.commands).context("Failed to encode replay commands")?;
        let final_root = state_root(&outcome.state).context("Failed to encode final state")?;

        println!("{} {}", style("Replay Log:").bold().cyan(), self.log.display());
        println!("{} {}", style("Seed:").bold().cyan(), log.seed);
        println!("{} {}", style("Commands:").bold().cyan(), log.commands.len());
        println!(
            "{} {}",
            style("Commands Root:").bold().cyan(),
            hex::encode(commands_root)
        );
        println!(
            "{} {}",
            style("State Root:").bold().cyan(),
            hex::encode(final_root)
        );
        println!();

        if self.events {
            println!("{}", style("Events:").bold().yellow());
            for (index, event) in outcome.events.iter().enumerate() {
                println!("  {:>4} {:?}", index, event);
            }
            println!();
        }

        match self.format {
            OutputFormat::Summary => print_summary(&outcome.state),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&outcome.state)
                    .context("Failed to serialize state to JSON")?;
                println!("{}", json);
            }
            OutputFormat::Debug => println!("{:#?}", outcome.state),
        }
        Ok(())
    }
}

fn print_summary(state: &MatchState) {
    println!("{}", style("=== Final State ===").bold().green());
    println!();

    println!("{}", style("Turn Information:").bold().yellow());
    println!("  Nonce: {}", state.nonce);
    println!("  Turn: {}", state.turn.turn_number);
    println!("  Active: {}", state.turn.active);
    println!("  Phase: {}", state.turn.phase);
    match state.winner {
        Some(winner) => println!("  Winner: {}", style(winner).bold().green()),
        None => println!("  Winner: -"),
    }
    println!();

    println!("{}", style("Players:").bold().yellow());
    for id in PlayerId::all() {
        let player = state.player(id);
        println!(
            "  {} ({}) - HP: {}/{}, CP: {}, Hand: {}, Deck: {}",
            id,
            player.hero,
            player.hp,
            player.max_hp,
            player.cp,
            player.hand.len(),
            player.deck.len()
        );
        for (token, stacks) in player.tokens.iter() {
            println!("      {} x{}", token, stacks);
        }
    }
}
