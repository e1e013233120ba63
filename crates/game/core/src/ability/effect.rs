//! Declarative effect vocabulary shared by abilities, cards and bonus rolls.

use std::collections::BTreeMap;

use crate::state::{AbilityId, CustomActionId, Symbol, TokenId};

/// Point in attack resolution at which an effect applies.
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
pub enum EffectTiming {
    Immediate,
    PreDefense,
    WithDamage,
    PostDamage,
}

/// Whom an effect applies to, relative to the acting player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    SelfPlayer,
    Opponent,
}

/// Value expression used by damage, heal and shield actions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Amount {
    Fixed(u32),
    /// `each` per die showing `symbol` among the dice that triggered the ability.
    PerSymbol { symbol: Symbol, each: u32 },
    /// `each` per stack of `token` held by the acting player.
    PerTokenStack { token: TokenId, each: u32 },
}

/// Gate evaluated just before an effect applies.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectCondition {
    /// Damage is above zero and not fully evaded.
    OnHit,
    OnMiss,
    MinDamage(u32),
    SelfHasToken { token: TokenId, stacks: u8 },
    OpponentHasToken { token: TokenId, stacks: u8 },
}

impl EffectCondition {
    /// Reads the attack's damage outcome.
    pub fn depends_on_damage(&self) -> bool {
        matches!(
            self,
            EffectCondition::OnHit | EffectCondition::OnMiss | EffectCondition::MinDamage(_)
        )
    }
}

/// Actions applied for each bonus die showing `face`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollOutcome {
    pub face: Symbol,
    pub actions: Vec<EffectAction>,
}

/// One branch of a forced choice.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChoiceOption {
    pub label: String,
    pub actions: Vec<EffectAction>,
}

/// Closed set of things an effect can do.
#[derive(Clone, Debug, PartialEq, Eq, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EffectAction {
    Damage {
        amount: Amount,
    },
    Heal {
        amount: Amount,
        target: Target,
    },
    /// Grants a consumable or unique token.
    GrantToken {
        token: TokenId,
        amount: u8,
        target: Target,
    },
    /// Inflicts a buff or debuff.
    GrantStatus {
        token: TokenId,
        stacks: u8,
        target: Target,
    },
    GrantDamageShield {
        amount: Amount,
        target: Target,
    },
    DrawCard {
        count: u8,
    },
    RollDie {
        count: u8,
        outcomes: Vec<RollOutcome>,
    },
    Choice {
        options: Vec<ChoiceOption>,
    },
    Custom {
        action: CustomActionId,
        #[cfg_attr(feature = "serde", serde(default))]
        params: BTreeMap<String, i32>,
    },
    ReplaceAbility {
        from: AbilityId,
        to: AbilityId,
    },
}

impl EffectAction {
    /// Visits this action and every action nested under it, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a EffectAction)) {
        visit(self);
        match self {
            EffectAction::RollDie { outcomes, .. } => {
                for outcome in outcomes {
                    for action in &outcome.actions {
                        action.walk(visit);
                    }
                }
            }
            EffectAction::Choice { options } => {
                for option in options {
                    for action in &option.actions {
                        action.walk(visit);
                    }
                }
            }
            _ => {}
        }
    }

    /// Damage contributors run before damage is finalised when timed `WithDamage`.
    /// A choice contributes when any of its options does.
    pub fn contributes_damage(&self) -> bool {
        match self {
            EffectAction::Damage { .. }
            | EffectAction::RollDie { .. }
            | EffectAction::Custom { .. } => true,
            EffectAction::Choice { options } => options
                .iter()
                .flat_map(|option| &option.actions)
                .any(EffectAction::contributes_damage),
            _ => false,
        }
    }
}

/// One entry in an ability's effect list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityEffect {
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub action: EffectAction,
    pub timing: EffectTiming,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<EffectCondition>,
}

impl AbilityEffect {
    pub fn new(action: EffectAction, timing: EffectTiming) -> Self {
        Self {
            description: String::new(),
            action,
            timing,
            condition: None,
        }
    }

    pub fn when(mut self, condition: EffectCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `WithDamage` effect that feeds the pending damage.
    pub fn is_contributor(&self) -> bool {
        self.timing == EffectTiming::WithDamage && self.action.contributes_damage()
    }
}
