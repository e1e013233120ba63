//! Print a hero definition.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use duel_core::ability::AbilityBody;
use duel_core::{AbilityKind, HeroDefinition};

use super::OutputFormat;
use crate::content;

/// Print a hero's dice, abilities and cards
#[derive(Parser)]
pub struct InspectHero {
    /// Hero id (e.g., monk, barbarian)
    #[arg(value_name = "HERO")]
    hero: String,

    /// Data directory (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl InspectHero {
    pub fn execute(self) -> Result<()> {
        let content = content::load(self.data_dir.as_deref())?;
        let Some(hero) = content
            .heroes
            .iter()
            .find(|hero| hero.id.as_str() == self.hero)
        else {
            let known: Vec<_> = content.heroes.iter().map(|hero| hero.id.as_str()).collect();
            anyhow::bail!(
                "Unknown hero '{}'\n\nHint: available heroes are {}",
                self.hero,
                known.join(", ")
            );
        };

        match self.format {
            OutputFormat::Summary => print_summary(hero),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(hero)
                    .context("Failed to serialize hero to JSON")?;
                println!("{}", json);
            }
            OutputFormat::Debug => println!("{:#?}", hero),
        }
        Ok(())
    }
}

fn print_summary(hero: &HeroDefinition) {
    println!(
        "{}",
        style(format!("=== {} ({}) ===", hero.name, hero.id)).bold().green()
    );
    println!();

    println!("{}", style("Dice Faces:").bold().yellow());
    for (index, symbol) in hero.dice_faces.iter().enumerate() {
        println!("  {} {}", index + 1, symbol);
    }
    println!();

    println!("{}", style("Abilities:").bold().yellow());
    for ability in &hero.abilities {
        let marker = if hero.loadout.contains(&ability.id) {
            style("*").green()
        } else {
            style(" ")
        };
        let kind = match ability.kind {
            AbilityKind::Offensive => style(ability.kind.as_ref()).red(),
            AbilityKind::Defensive => style(ability.kind.as_ref()).blue(),
        };
        let tags = if ability.tags.is_empty() {
            String::new()
        } else {
            format!(" {:?}", ability.tags)
        };
        println!("  {} {} [{}]{}", marker, ability.id, kind, tags);

        match &ability.body {
            AbilityBody::Single { trigger, effects } => {
                println!("      when {:?}: {} effect(s)", trigger, effects.len());
            }
            AbilityBody::Variants(variants) => {
                for variant in variants {
                    println!(
                        "      p{} when {:?}: {} effect(s)",
                        variant.priority,
                        variant.trigger,
                        variant.effects.len()
                    );
                }
            }
        }
    }
    println!();

    println!("{}", style("Cards:").bold().yellow());
    for card in &hero.cards {
        let phases: Vec<_> = card.playable_in.iter().map(|phase| phase.as_ref()).collect();
        println!(
            "  {} x{} - {} CP, {}",
            card.id,
            card.copies,
            card.cp_cost,
            phases.join("/")
        );
    }
    println!();
    println!("  Deck size: {}", hero.deck_list().len());
}
