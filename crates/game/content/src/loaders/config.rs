//! Rules configuration loader.

use std::path::Path;

use duel_core::RulesConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for rules configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load rules from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<RulesConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<RulesConfig> {
        let config: RulesConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.offensive_roll_attempts == 0 {
            anyhow::bail!("offensive_roll_attempts must be at least 1");
        }
        if config.starting_hp == 0 {
            anyhow::bail!("starting_hp must be at least 1");
        }
        Ok(config)
    }
}
