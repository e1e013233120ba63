use crate::ability::{AbilityTags, VariantRef};
use crate::combat::PendingDamage;
use crate::dice::Die;

use super::{AbilityId, PlayerId};

/// Position inside an effect plan. The index has already been advanced past
/// the effect that suspended, so resuming never re-applies it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectCursor {
    pub next: usize,
}

impl EffectCursor {
    pub const START: Self = Self { next: 0 };
}

/// Where a suspended attack resumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackStage {
    /// Attacker's `PreDefense` effects.
    PreDefense(EffectCursor),
    /// Waiting for the defender to pick and roll a defensive ability.
    AwaitDefense,
    /// Defensive ability effects; their damage hits the attacker directly.
    DefenseEffects(EffectCursor),
    /// `WithDamage` contributors build the pending damage.
    BuildDamage(EffectCursor),
    /// Response windows before damage is applied.
    Respond,
    /// Shields, finalisation and HP reduction.
    ApplyDamage,
    /// `WithDamage` riders, then `Immediate`, then `PostDamage`.
    Aftermath(EffectCursor),
    /// Shield expiry, attack-end passives and leaving the attack.
    Finish,
}

/// Progress through the response window sequence of one attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum WindowPhase {
    Idle,
    AttackerBoost,
    DefenderMitigation,
    Resolved,
}

/// The attack currently being resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackState {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub ability: VariantRef,
    pub tags: AbilityTags,
    /// Dice that triggered the offensive ability.
    pub offense_dice: Vec<Die>,
    /// Defensive ability picked (or auto-assigned) for the defender's roll.
    pub defense_choice: Option<AbilityId>,
    /// Defensive variant the roll resolved to.
    pub defense: Option<VariantRef>,
    pub defense_dice: Vec<Die>,
    pub pending: PendingDamage,
    pub stage: AttackStage,
    pub window: WindowPhase,
}

impl AttackState {
    pub fn new(
        attacker: PlayerId,
        ability: VariantRef,
        tags: AbilityTags,
        offense_dice: Vec<Die>,
    ) -> Self {
        Self {
            attacker,
            defender: attacker.opponent(),
            ability,
            tags,
            offense_dice,
            defense_choice: None,
            defense: None,
            defense_dice: Vec::new(),
            pending: PendingDamage::new(),
            stage: AttackStage::PreDefense(EffectCursor::START),
            window: WindowPhase::Idle,
        }
    }

    /// Unblockable and ultimate attacks skip the defensive roll and mitigation.
    pub fn bypasses_defense(&self) -> bool {
        self.tags
            .intersects(AbilityTags::UNBLOCKABLE | AbilityTags::ULTIMATE)
    }

    pub fn ignores_shields(&self) -> bool {
        self.tags.contains(AbilityTags::ULTIMATE)
    }
}
