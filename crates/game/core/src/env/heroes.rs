//! Hero and token definition tables.

use std::collections::BTreeMap;

use crate::ability::{AbilityDefinition, CardDefinition, DefinitionError, HeroDefinition};
use crate::state::{AbilityId, CardId, HeroId, TokenId};
use crate::token::TokenDefinition;

/// Read-only access to hero, ability, card and token definitions.
pub trait HeroOracle: Send + Sync {
    fn hero(&self, id: &HeroId) -> Option<&HeroDefinition>;

    fn token(&self, id: &TokenId) -> Option<&TokenDefinition>;

    fn ability(&self, hero: &HeroId, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.hero(hero).and_then(|hero| hero.ability(id))
    }

    fn card(&self, hero: &HeroId, id: &CardId) -> Option<&CardDefinition> {
        self.hero(hero).and_then(|hero| hero.card(id))
    }
}

/// Validated, immutable definition tables loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct HeroTables {
    heroes: BTreeMap<HeroId, HeroDefinition>,
    tokens: BTreeMap<TokenId, TokenDefinition>,
}

impl HeroTables {
    /// Builds the tables, rejecting duplicates and malformed definitions.
    pub fn new(
        heroes: impl IntoIterator<Item = HeroDefinition>,
        tokens: impl IntoIterator<Item = TokenDefinition>,
    ) -> Result<Self, DefinitionError> {
        let mut token_table = BTreeMap::new();
        for token in tokens {
            token.validate()?;
            if token_table.contains_key(&token.id) {
                return Err(DefinitionError::DuplicateToken(token.id));
            }
            token_table.insert(token.id.clone(), token);
        }

        let mut hero_table = BTreeMap::new();
        for hero in heroes {
            hero.validate(&token_table)?;
            if hero_table.contains_key(&hero.id) {
                return Err(DefinitionError::DuplicateHero(hero.id));
            }
            hero_table.insert(hero.id.clone(), hero);
        }

        tracing::debug!(
            heroes = hero_table.len(),
            tokens = token_table.len(),
            "definition tables validated"
        );

        Ok(Self {
            heroes: hero_table,
            tokens: token_table,
        })
    }

    pub fn heroes(&self) -> impl Iterator<Item = &HeroDefinition> {
        self.heroes.values()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenDefinition> {
        self.tokens.values()
    }
}

impl HeroOracle for HeroTables {
    fn hero(&self, id: &HeroId) -> Option<&HeroDefinition> {
        self.heroes.get(id)
    }

    fn token(&self, id: &TokenId) -> Option<&TokenDefinition> {
        self.tokens.get(id)
    }
}
