//! Completeness audit over hero data and the built-in handlers.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;
use duel_content::{audit, builtin_registry};

use crate::content;

/// Check hero data against the custom action registry
#[derive(Parser)]
pub struct Audit {
    /// Data directory to audit (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl Audit {
    pub fn execute(self) -> Result<()> {
        let content = content::load(self.data_dir.as_deref())?;
        let registry = builtin_registry()?;
        let report = audit(&content.heroes, &content.tokens, &registry);

        println!(
            "{} {} heroes, {} tokens, {} custom actions",
            style("Audited:").bold().cyan(),
            content.heroes.len(),
            content.tokens.len(),
            registry.len()
        );

        if report.is_clean() {
            println!("{}", style("No findings").bold().green());
            return Ok(());
        }

        println!();
        for finding in &report.findings {
            println!("  {} {}", style("✗").red(), finding);
        }
        println!();
        anyhow::bail!("content audit found {} problem(s)", report.findings.len())
    }
}
