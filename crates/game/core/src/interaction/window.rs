use crate::combat::ModificationSource;
use crate::env::HeroOracle;
use crate::event::{DomainEvent, InteractionKind, RollPurpose};
use crate::resolve::{ResolveCtx, ResolveError, drive};
use crate::state::{AttackStage, MatchState, PlayerId, TokenId, WindowPhase};
use crate::token::{
    ActiveUse, ActiveUseEffect, ActiveUseTiming, LedgerError, TokenCategory, TokenDefinition,
    usable_tokens,
};

use super::{Interaction, close, open};

/// The two response windows of an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum WindowKind {
    AttackerBoost,
    DefenderMitigation,
}

impl WindowKind {
    pub fn timing(self) -> ActiveUseTiming {
        match self {
            WindowKind::AttackerBoost => ActiveUseTiming::BeforeDamageDealt,
            WindowKind::DefenderMitigation => ActiveUseTiming::BeforeDamageReceived,
        }
    }

    fn phase(self) -> WindowPhase {
        match self {
            WindowKind::AttackerBoost => WindowPhase::AttackerBoost,
            WindowKind::DefenderMitigation => WindowPhase::DefenderMitigation,
        }
    }
}

impl From<WindowKind> for InteractionKind {
    fn from(kind: WindowKind) -> Self {
        match kind {
            WindowKind::AttackerBoost => InteractionKind::AttackerBoost,
            WindowKind::DefenderMitigation => InteractionKind::DefenderMitigation,
        }
    }
}

/// Tokens the window's owner may spend right now. Empty when the window
/// should not be open at all.
pub fn window_tokens<'e>(
    state: &MatchState,
    heroes: &'e dyn HeroOracle,
    kind: WindowKind,
) -> Result<Vec<(&'e TokenDefinition, &'e ActiveUse)>, LedgerError> {
    let Some(attack) = state.attack.as_ref() else {
        return Ok(Vec::new());
    };
    let pending = &attack.pending;
    if pending.is_evaded() {
        return Ok(Vec::new());
    }

    let owner = match kind {
        WindowKind::AttackerBoost if pending.original() > 0 => attack.attacker,
        WindowKind::DefenderMitigation if !attack.bypasses_defense() && pending.current() > 0 => {
            attack.defender
        }
        _ => return Ok(Vec::new()),
    };
    let eligible = match kind {
        WindowKind::AttackerBoost => boosts_damage,
        WindowKind::DefenderMitigation => mitigates_damage,
    };

    let usable = usable_tokens(&state.player(owner).tokens, kind.timing(), heroes)?;
    Ok(usable
        .into_iter()
        .filter(|(definition, active)| eligible(definition, active))
        .collect())
}

fn boosts_damage(definition: &TokenDefinition, active: &ActiveUse) -> bool {
    definition.category == TokenCategory::Consumable
        && matches!(active.effect, ActiveUseEffect::ModifyDamage { .. })
}

fn mitigates_damage(_: &TokenDefinition, active: &ActiveUse) -> bool {
    !matches!(active.effect, ActiveUseEffect::RerollBonusDie)
}

/// Moves the window machine forward, opening the next window that has
/// something to spend. Once resolved, the attack proceeds to damage.
pub fn advance_window(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    loop {
        let Some(attack) = ctx.state.attack.as_mut() else {
            return Err(ResolveError::AttackMissing {
                player: ctx.state.turn.active,
            });
        };
        let (next, owner) = match attack.window {
            WindowPhase::Idle => (WindowKind::AttackerBoost, attack.attacker),
            WindowPhase::AttackerBoost => (WindowKind::DefenderMitigation, attack.defender),
            WindowPhase::DefenderMitigation | WindowPhase::Resolved => {
                attack.window = WindowPhase::Resolved;
                attack.stage = AttackStage::ApplyDamage;
                tracing::trace!("response windows resolved");
                return Ok(());
            }
        };
        attack.window = next.phase();

        let heroes = ctx.heroes()?;
        if window_tokens(ctx.state, heroes, next)?.is_empty() {
            tracing::trace!(window = %next, "window skipped");
            continue;
        }
        open(ctx, Interaction::ResponseWindow { owner, kind: next });
        return Ok(());
    }
}

/// Spends one use of `token` inside the open window. The window closes
/// itself once nothing usable remains.
pub fn spend_window_token(
    ctx: &mut ResolveCtx<'_, '_>,
    owner: PlayerId,
    token: &TokenId,
) -> Result<(), ResolveError> {
    let Some(Interaction::ResponseWindow { kind, .. }) = ctx.state.interaction.current else {
        return Ok(());
    };
    let definition = ctx.token(token)?;
    let Some(active) = definition.active_use_at(kind.timing()) else {
        return Err(LedgerError::InsufficientStacks {
            token: token.clone(),
            have: ctx.state.player(owner).tokens.stacks(token),
            need: 1,
        }
        .into());
    };

    ctx.state.player_mut(owner).tokens.spend(token, active.cost)?;
    tracing::debug!(%owner, %token, cost = active.cost, window = %kind, "token used");
    ctx.emit(DomainEvent::TokenUsed {
        player: owner,
        token: token.clone(),
        cost: active.cost,
    });

    match &active.effect {
        ActiveUseEffect::ModifyDamage { amount } => {
            let amount = i32::try_from(*amount).unwrap_or(i32::MAX);
            let (source, delta) = match kind {
                WindowKind::AttackerBoost => {
                    (ModificationSource::AttackerToken(token.clone()), amount)
                }
                WindowKind::DefenderMitigation => {
                    (ModificationSource::DefenderToken(token.clone()), -amount)
                }
            };
            if let Some(attack) = ctx.state.attack.as_mut() {
                attack.pending.apply_modifier(source, delta);
            }
        }
        ActiveUseEffect::RollToNegate { success_at_most } => {
            let dice = ctx.roll_dice(owner, 1)?;
            let value = dice.first().map_or(0, |die| die.value);
            ctx.emit(DomainEvent::DiceRolled {
                player: owner,
                purpose: RollPurpose::Negate,
                dice,
            });
            if value > 0 && value <= *success_at_most {
                if let Some(attack) = ctx.state.attack.as_mut() {
                    attack
                        .pending
                        .evade(ModificationSource::DefenderToken(token.clone()));
                }
                tracing::debug!(defender = %owner, %token, value, "attack evaded");
                ctx.emit(DomainEvent::AttackEvaded {
                    defender: owner,
                    token: token.clone(),
                });
            }
        }
        ActiveUseEffect::RerollBonusDie => {}
    }

    let heroes = ctx.heroes()?;
    if window_tokens(ctx.state, heroes, kind)?.is_empty() {
        return close_window(ctx);
    }
    Ok(())
}

/// Closes the open window and lets the attack continue.
pub fn close_window(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    close(ctx);
    drive(ctx)
}
