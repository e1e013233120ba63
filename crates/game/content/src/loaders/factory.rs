//! Content factory for building definition tables from data files.

use std::path::{Path, PathBuf};

use duel_core::{DefinitionError, HeroDefinition, HeroTables, RulesConfig, TokenDefinition};

use crate::loaders::{ConfigLoader, HeroLoader, LoadResult, TokenLoader};

/// Everything a host needs to build the core oracles.
#[derive(Clone, Debug)]
pub struct Content {
    pub rules: RulesConfig,
    pub heroes: Vec<HeroDefinition>,
    pub tokens: Vec<TokenDefinition>,
}

impl Content {
    /// Validates the definitions into immutable tables.
    pub fn tables(&self) -> Result<HeroTables, DefinitionError> {
        HeroTables::new(self.heroes.iter().cloned(), self.tokens.iter().cloned())
    }
}

/// Content factory that loads all hero content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── tokens.ron
/// └── heroes/
///     ├── barbarian.ron
///     └── monk.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load rules configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<RulesConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load the token catalogue from `tokens.ron`.
    pub fn load_tokens(&self) -> LoadResult<Vec<TokenDefinition>> {
        TokenLoader::load(&self.data_dir.join("tokens.ron"))
    }

    /// Load every hero under `heroes/`.
    pub fn load_heroes(&self) -> LoadResult<Vec<HeroDefinition>> {
        HeroLoader::load_dir(&self.data_dir.join("heroes"))
    }

    pub fn load_all(&self) -> LoadResult<Content> {
        let content = Content {
            rules: self.load_config()?,
            heroes: self.load_heroes()?,
            tokens: self.load_tokens()?,
        };
        tracing::info!(
            data_dir = %self.data_dir.display(),
            heroes = content.heroes.len(),
            tokens = content.tokens.len(),
            "content loaded"
        );
        Ok(content)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
