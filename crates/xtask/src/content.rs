//! Content selection shared by every command.

use std::path::Path;

use anyhow::{Context, Result};
use duel_content::{Content, ContentFactory, builtin};

/// Loads content from `data_dir`, or the bundled data set when absent.
pub fn load(data_dir: Option<&Path>) -> Result<Content> {
    match data_dir {
        Some(dir) => ContentFactory::new(dir)
            .load_all()
            .with_context(|| format!("Failed to load content from {}", dir.display())),
        None => builtin().context("Failed to parse bundled content"),
    }
}
