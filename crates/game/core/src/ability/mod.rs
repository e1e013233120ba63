//! Ability, card and hero definitions.
//!
//! Definitions are immutable after load. Match state refers to them by id and
//! the engine looks them up through [`crate::env::HeroOracle`].
mod effect;
mod error;
mod hero;

pub use effect::{
    AbilityEffect, Amount, ChoiceOption, EffectAction, EffectCondition, EffectTiming, RollOutcome,
    Target,
};
pub use error::DefinitionError;
pub use hero::{CardDefinition, HeroDefinition};

use std::collections::BTreeSet;

use bitflags::bitflags;

use crate::config::RulesConfig;
use crate::dice::TriggerCondition;
use crate::state::AbilityId;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AbilityKind {
    Offensive,
    Defensive,
}

bitflags! {
    /// Tags altering how an attack interacts with defense.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct AbilityTags: u8 {
        /// Skips the defensive roll and defender mitigation.
        const UNBLOCKABLE = 1 << 0;
        /// Unblockable, and also ignores damage shields.
        const ULTIMATE    = 1 << 1;
    }
}

/// One alternative trigger/effect pair of a variant ability.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityVariant {
    pub trigger: TriggerCondition,
    pub priority: i32,
    pub effects: Vec<AbilityEffect>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityBody {
    Single {
        trigger: TriggerCondition,
        effects: Vec<AbilityEffect>,
    },
    Variants(Vec<AbilityVariant>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: AbilityId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub kind: AbilityKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: AbilityTags,
    pub body: AbilityBody,
}

/// The concrete ability (and variant) an activation resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariantRef {
    pub ability: AbilityId,
    pub variant: Option<usize>,
}

impl VariantRef {
    pub fn new(ability: AbilityId, variant: Option<usize>) -> Self {
        Self { ability, variant }
    }
}

/// A trigger as seen by the matcher.
#[derive(Clone, Copy, Debug)]
pub struct TriggerEntry<'a> {
    pub variant: Option<usize>,
    pub trigger: &'a TriggerCondition,
    pub priority: i32,
}

impl AbilityDefinition {
    pub fn single(
        id: impl Into<AbilityId>,
        kind: AbilityKind,
        trigger: TriggerCondition,
        effects: Vec<AbilityEffect>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            tags: AbilityTags::empty(),
            body: AbilityBody::Single { trigger, effects },
        }
    }

    pub fn with_variants(
        id: impl Into<AbilityId>,
        kind: AbilityKind,
        variants: Vec<AbilityVariant>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            tags: AbilityTags::empty(),
            body: AbilityBody::Variants(variants),
        }
    }

    pub fn tagged(mut self, tags: AbilityTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn triggers(&self) -> Vec<TriggerEntry<'_>> {
        match &self.body {
            AbilityBody::Single { trigger, .. } => vec![TriggerEntry {
                variant: None,
                trigger,
                priority: 0,
            }],
            AbilityBody::Variants(variants) => variants
                .iter()
                .enumerate()
                .map(|(index, variant)| TriggerEntry {
                    variant: Some(index),
                    trigger: &variant.trigger,
                    priority: variant.priority,
                })
                .collect(),
        }
    }

    /// Effects of the body or of the given variant.
    pub fn effects(&self, variant: Option<usize>) -> Option<&[AbilityEffect]> {
        match (&self.body, variant) {
            (AbilityBody::Single { effects, .. }, None) => Some(effects),
            (AbilityBody::Variants(variants), Some(index)) => {
                variants.get(index).map(|v| v.effects.as_slice())
            }
            _ => None,
        }
    }

    /// Every effect across all variants, for audits.
    pub fn all_effects(&self) -> impl Iterator<Item = &AbilityEffect> {
        let slices: Vec<&[AbilityEffect]> = match &self.body {
            AbilityBody::Single { effects, .. } => vec![effects.as_slice()],
            AbilityBody::Variants(variants) => {
                variants.iter().map(|v| v.effects.as_slice()).collect()
            }
        };
        slices.into_iter().flatten()
    }

    /// Size of the defensive roll, taken from the largest phase trigger.
    pub fn defense_dice_count(&self) -> Option<u8> {
        self.triggers()
            .iter()
            .filter_map(|entry| entry.trigger.dice_count())
            .max()
    }

    /// Structural checks that need no other definitions.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if let AbilityBody::Variants(variants) = &self.body {
            if variants.is_empty() {
                return Err(DefinitionError::EmptyVariants(self.id.clone()));
            }
            let mut seen = BTreeSet::new();
            for variant in variants {
                if !seen.insert(variant.priority) {
                    return Err(DefinitionError::DuplicatePriority {
                        ability: self.id.clone(),
                        priority: variant.priority,
                    });
                }
            }
        }

        for entry in self.triggers() {
            if let Some(dice_count) = entry.trigger.dice_count()
                && (dice_count == 0 || usize::from(dice_count) > RulesConfig::MAX_DICE)
            {
                return Err(DefinitionError::InvalidDiceCount {
                    ability: self.id.clone(),
                    dice_count,
                    max: RulesConfig::MAX_DICE,
                });
            }
        }

        if self.kind == AbilityKind::Defensive && self.defense_dice_count().is_none() {
            return Err(DefinitionError::DefensiveWithoutDiceCount(self.id.clone()));
        }
        // Defense effects resolve before the attack's damage is built.
        if self.kind == AbilityKind::Defensive
            && self
                .all_effects()
                .filter_map(|effect| effect.condition.as_ref())
                .any(EffectCondition::depends_on_damage)
        {
            return Err(DefinitionError::DamageConditionOnDefense(self.id.clone()));
        }

        let owner = self.id.as_str();
        for effect in self.all_effects() {
            validate_action_shape(owner, &effect.action)?;
        }
        Ok(())
    }
}

/// Checks nested action structure (choice options, bonus dice counts).
pub(crate) fn validate_action_shape(
    owner: &str,
    action: &EffectAction,
) -> Result<(), DefinitionError> {
    let mut result = Ok(());
    action.walk(&mut |nested| {
        if result.is_err() {
            return;
        }
        result = match nested {
            EffectAction::Choice { options } if options.is_empty() => {
                Err(DefinitionError::EmptyChoice {
                    owner: owner.to_owned(),
                })
            }
            EffectAction::RollDie { count, .. }
                if *count == 0 || usize::from(*count) > RulesConfig::MAX_BONUS_DICE =>
            {
                Err(DefinitionError::InvalidBonusDice {
                    owner: owner.to_owned(),
                    count: *count,
                    max: RulesConfig::MAX_BONUS_DICE,
                })
            }
            _ => Ok(()),
        };
    });
    result
}
