use std::collections::{BTreeMap, BTreeSet};

use crate::state::{AbilityId, CardId, HeroId, Phase, Symbol, TokenId};
use crate::token::{TokenCategory, TokenDefinition};

use super::{AbilityDefinition, Amount, DefinitionError, EffectAction, EffectCondition};
use super::validate_action_shape;

/// A playable card. Its actions resolve immediately when played.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardDefinition {
    pub id: CardId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub cp_cost: u32,
    pub playable_in: Vec<Phase>,
    #[cfg_attr(feature = "serde", serde(default = "CardDefinition::default_copies"))]
    pub copies: u8,
    pub effects: Vec<EffectAction>,
}

impl CardDefinition {
    fn default_copies() -> u8 {
        1
    }
}

/// A hero: dice faces, ability table, starting loadout and deck list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeroDefinition {
    pub id: HeroId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Symbol on each face, indexed by `value - 1`.
    pub dice_faces: Vec<Symbol>,
    /// Every ability the hero can hold, including upgrade targets.
    pub abilities: Vec<AbilityDefinition>,
    /// Abilities held at the start of a match.
    pub loadout: Vec<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cards: Vec<CardDefinition>,
}

impl HeroDefinition {
    pub const DIE_FACES: usize = 6;

    pub fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.iter().find(|ability| &ability.id == id)
    }

    pub fn card(&self, id: &CardId) -> Option<&CardDefinition> {
        self.cards.iter().find(|card| &card.id == id)
    }

    /// Symbol shown by a die with `value` (1-based).
    pub fn face(&self, value: u8) -> Option<&Symbol> {
        usize::from(value)
            .checked_sub(1)
            .and_then(|index| self.dice_faces.get(index))
    }

    /// Card ids with duplicates expanded, in declaration order.
    pub fn deck_list(&self) -> Vec<CardId> {
        self.cards
            .iter()
            .flat_map(|card| std::iter::repeat_n(card.id.clone(), usize::from(card.copies)))
            .collect()
    }

    /// Validates the hero against the global token catalogue.
    pub fn validate(
        &self,
        tokens: &BTreeMap<TokenId, TokenDefinition>,
    ) -> Result<(), DefinitionError> {
        if self.dice_faces.len() != Self::DIE_FACES {
            return Err(DefinitionError::InvalidDiceFaces {
                hero: self.id.clone(),
                count: self.dice_faces.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for ability in &self.abilities {
            if !seen.insert(&ability.id) {
                return Err(DefinitionError::DuplicateAbility {
                    hero: self.id.clone(),
                    ability: ability.id.clone(),
                });
            }
            ability.validate()?;
            for effect in ability.all_effects() {
                self.validate_action(ability.id.as_str(), &effect.action, tokens)?;
                if let Some(condition) = &effect.condition {
                    check_condition(ability.id.as_str(), condition, tokens)?;
                }
            }
        }

        for ability in &self.loadout {
            if self.ability(ability).is_none() {
                return Err(DefinitionError::UnknownAbility {
                    owner: self.id.to_string(),
                    ability: ability.clone(),
                });
            }
        }

        let mut cards = BTreeSet::new();
        for card in &self.cards {
            if !cards.insert(&card.id) {
                return Err(DefinitionError::DuplicateCard {
                    hero: self.id.clone(),
                    card: card.id.clone(),
                });
            }
            for action in &card.effects {
                validate_action_shape(card.id.as_str(), action)?;
                self.validate_action(card.id.as_str(), action, tokens)?;
            }
        }

        Ok(())
    }

    fn validate_action(
        &self,
        owner: &str,
        action: &EffectAction,
        tokens: &BTreeMap<TokenId, TokenDefinition>,
    ) -> Result<(), DefinitionError> {
        let mut result = Ok(());
        action.walk(&mut |nested| {
            if result.is_err() {
                return;
            }
            result = match nested {
                EffectAction::GrantToken { token, .. } => check_category(
                    owner,
                    token,
                    tokens,
                    "grant_token",
                    &[TokenCategory::Consumable, TokenCategory::Unique],
                ),
                EffectAction::GrantStatus { token, .. } => check_category(
                    owner,
                    token,
                    tokens,
                    "grant_status",
                    &[TokenCategory::Debuff, TokenCategory::Buff],
                ),
                EffectAction::ReplaceAbility { from, to } => [from, to]
                    .into_iter()
                    .find(|id| self.ability(id).is_none())
                    .map_or(Ok(()), |missing| {
                        Err(DefinitionError::UnknownAbility {
                            owner: owner.to_owned(),
                            ability: missing.clone(),
                        })
                    }),
                EffectAction::Damage { amount }
                | EffectAction::Heal { amount, .. }
                | EffectAction::GrantDamageShield { amount, .. } => {
                    check_amount(owner, amount, tokens)
                }
                _ => Ok(()),
            };
        });
        result
    }
}

fn check_category(
    owner: &str,
    token: &TokenId,
    tokens: &BTreeMap<TokenId, TokenDefinition>,
    action: &'static str,
    allowed: &[TokenCategory],
) -> Result<(), DefinitionError> {
    let definition = tokens.get(token).ok_or_else(|| DefinitionError::UnknownToken {
        owner: owner.to_owned(),
        token: token.clone(),
    })?;
    if allowed.contains(&definition.category) {
        Ok(())
    } else {
        Err(DefinitionError::TokenCategoryMismatch {
            owner: owner.to_owned(),
            token: token.clone(),
            action,
        })
    }
}

fn check_amount(
    owner: &str,
    amount: &Amount,
    tokens: &BTreeMap<TokenId, TokenDefinition>,
) -> Result<(), DefinitionError> {
    match amount {
        Amount::PerTokenStack { token, .. } if !tokens.contains_key(token) => {
            Err(DefinitionError::UnknownToken {
                owner: owner.to_owned(),
                token: token.clone(),
            })
        }
        _ => Ok(()),
    }
}

fn check_condition(
    owner: &str,
    condition: &EffectCondition,
    tokens: &BTreeMap<TokenId, TokenDefinition>,
) -> Result<(), DefinitionError> {
    match condition {
        EffectCondition::SelfHasToken { token, .. }
        | EffectCondition::OpponentHasToken { token, .. }
            if !tokens.contains_key(token) =>
        {
            Err(DefinitionError::UnknownToken {
                owner: owner.to_owned(),
                token: token.clone(),
            })
        }
        _ => Ok(()),
    }
}
