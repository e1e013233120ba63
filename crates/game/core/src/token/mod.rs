//! Token and status definitions plus the per-player stack ledger.
//!
//! Tokens cover four categories: consumables the holder spends voluntarily,
//! buffs and debuffs that modify damage or fire passives, and unique markers
//! with a single stack. The ledger only counts stacks; what a token does is
//! read from its [`TokenDefinition`] whenever the engine polls it.
mod ledger;
mod passive;

pub use ledger::{LedgerError, StackChange, TokenLedger};
pub use passive::{TriggeredPassive, triggered_passives, usable_tokens};

use crate::ability::DefinitionError;
use crate::state::{CustomActionId, Phase, TokenId};

use std::collections::BTreeMap;

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
pub enum TokenCategory {
    Consumable,
    Debuff,
    Buff,
    /// Single-stack marker.
    Unique,
}

/// When a holder may voluntarily spend a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActiveUseTiming {
    BeforeDamageDealt,
    BeforeDamageReceived,
    AfterBonusRoll,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActiveUseEffect {
    /// Adds to damage dealt, or subtracts from damage received, per use.
    ModifyDamage { amount: u32 },
    /// Rolls a die; a result at or below `success_at_most` evades the attack.
    RollToNegate { success_at_most: u8 },
    /// Rerolls one bonus die.
    RerollBonusDie,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveUse {
    pub timings: Vec<ActiveUseTiming>,
    /// Stacks spent per use.
    pub cost: u8,
    pub effect: ActiveUseEffect,
}

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
pub enum PassiveTiming {
    OnPhaseEnter,
    OnTurnStart,
    OnDamageReceived,
    OnAttackEnd,
    OnOffensiveRollEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    Hp,
    Cp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassiveAction {
    /// Moves the turn past the phase being entered.
    SkipPhase,
    /// Direct damage to the holder.
    Damage {
        amount: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        per_stack: bool,
    },
    ModifyStat {
        stat: StatKind,
        delta: i32,
        #[cfg_attr(feature = "serde", serde(default))]
        per_stack: bool,
    },
    /// Grants the active player another offensive roll phase.
    ExtraAttack,
    Custom {
        action: CustomActionId,
        #[cfg_attr(feature = "serde", serde(default))]
        params: BTreeMap<String, i32>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassiveTrigger {
    pub timing: PassiveTiming,
    /// Only fires while the turn is in this phase.
    #[cfg_attr(feature = "serde", serde(default))]
    pub phase: Option<Phase>,
    pub actions: Vec<PassiveAction>,
    /// Removes every stack after firing unless a removal cost is declared.
    #[cfg_attr(feature = "serde", serde(default))]
    pub removable: bool,
    /// CP the holder may pay to remove the token early.
    #[cfg_attr(feature = "serde", serde(default))]
    pub removal_cost: Option<u32>,
}

impl PassiveTrigger {
    pub fn auto_removes(&self) -> bool {
        self.removable && self.removal_cost.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierDirection {
    /// Applies to attacks the holder receives.
    Incoming,
    /// Applies to attacks the holder makes.
    Outgoing,
}

/// Flat additive change to attack damage while the token is held.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageModifier {
    pub direction: ModifierDirection,
    pub amount: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_stack: bool,
}

impl DamageModifier {
    pub fn delta(&self, stacks: u8) -> i32 {
        if self.per_stack {
            self.amount * i32::from(stacks)
        } else {
            self.amount
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenDefinition {
    pub id: TokenId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub category: TokenCategory,
    pub stack_limit: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub active_use: Option<ActiveUse>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub passive_trigger: Option<PassiveTrigger>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_modifier: Option<DamageModifier>,
}

impl TokenDefinition {
    pub fn new(id: impl Into<TokenId>, category: TokenCategory, stack_limit: u8) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category,
            stack_limit,
            active_use: None,
            passive_trigger: None,
            damage_modifier: None,
        }
    }

    pub fn with_active_use(mut self, active_use: ActiveUse) -> Self {
        self.active_use = Some(active_use);
        self
    }

    pub fn with_passive(mut self, passive: PassiveTrigger) -> Self {
        self.passive_trigger = Some(passive);
        self
    }

    pub fn with_damage_modifier(mut self, modifier: DamageModifier) -> Self {
        self.damage_modifier = Some(modifier);
        self
    }

    /// Active use available at `timing`, if any.
    pub fn active_use_at(&self, timing: ActiveUseTiming) -> Option<&ActiveUse> {
        self.active_use
            .as_ref()
            .filter(|active| active.timings.contains(&timing))
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.stack_limit == 0 {
            return Err(DefinitionError::ZeroStackLimit(self.id.clone()));
        }
        if self.category == TokenCategory::Unique && self.stack_limit != 1 {
            return Err(DefinitionError::UniqueStackLimit {
                token: self.id.clone(),
                limit: self.stack_limit,
            });
        }
        if let Some(active) = &self.active_use {
            if active.timings.is_empty() {
                return Err(DefinitionError::ActiveUseWithoutTiming(self.id.clone()));
            }
            if active.cost == 0 {
                return Err(DefinitionError::ActiveUseWithoutCost(self.id.clone()));
            }
        }
        if let Some(passive) = &self.passive_trigger
            && passive.actions.is_empty()
        {
            return Err(DefinitionError::PassiveWithoutActions(self.id.clone()));
        }
        if let Some(modifier) = &self.damage_modifier
            && modifier.amount == 0
        {
            return Err(DefinitionError::ZeroDamageModifier(self.id.clone()));
        }
        Ok(())
    }
}
