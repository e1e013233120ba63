//! Hero and token catalogue loaders.

use std::path::Path;

use duel_core::{HeroDefinition, TokenDefinition};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Token catalogue structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCatalog {
    pub tokens: Vec<TokenDefinition>,
}

/// Loader for the global token catalogue.
pub struct TokenLoader;

impl TokenLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<TokenDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse token catalog {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Vec<TokenDefinition>> {
        let catalog: TokenCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse token catalog RON: {}", e))?;
        Ok(catalog.tokens)
    }
}

/// Loader for hero definitions, one hero per RON file.
pub struct HeroLoader;

impl HeroLoader {
    pub fn load(path: &Path) -> LoadResult<HeroDefinition> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse hero {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<HeroDefinition> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse hero RON: {}", e))
    }

    /// Loads every `*.ron` file in `dir`, ordered by file name.
    pub fn load_dir(dir: &Path) -> LoadResult<Vec<HeroDefinition>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut heroes = Vec::with_capacity(paths.len());
        for path in paths {
            let hero = Self::load(&path)?;
            tracing::debug!(hero = %hero.id, path = %path.display(), "hero loaded");
            heroes.push(hero);
        }
        Ok(heroes)
    }
}
