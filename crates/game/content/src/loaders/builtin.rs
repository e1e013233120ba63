//! Hero data bundled into the binary.

use crate::loaders::{ConfigLoader, Content, HeroLoader, LoadResult, TokenLoader};

const CONFIG: &str = include_str!("../../data/config.toml");
const TOKENS: &str = include_str!("../../data/tokens.ron");
const HEROES: [(&str, &str); 2] = [
    ("barbarian.ron", include_str!("../../data/heroes/barbarian.ron")),
    ("monk.ron", include_str!("../../data/heroes/monk.ron")),
];

/// Parses the embedded data set.
pub fn builtin() -> LoadResult<Content> {
    let rules = ConfigLoader::parse(CONFIG)?;
    let tokens = TokenLoader::parse(TOKENS)?;
    let mut heroes = Vec::with_capacity(HEROES.len());
    for (file, source) in HEROES {
        let hero = HeroLoader::parse(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse embedded {}: {}", file, e))?;
        heroes.push(hero);
    }
    Ok(Content {
        rules,
        heroes,
        tokens,
    })
}
