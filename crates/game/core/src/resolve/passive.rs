//! Passive token triggers.

use crate::event::DomainEvent;
use crate::state::PlayerId;
use crate::token::{PassiveAction, PassiveTiming, StatKind, TriggeredPassive, triggered_passives};

use super::actions::{change_cp, deal_direct, heal, lose_hp, run_custom};
use super::{ActionScope, ResolveCtx, ResolveError};

/// What the fired passives asked the caller to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassiveOutcome {
    /// Some passive asked for the phase being entered to be skipped.
    pub skip_phase: bool,
}

/// Fires every passive `holder` has for `timing` in the current phase.
///
/// Eligible tokens are collected before any action runs; auto-removable
/// tokens lose all their stacks after their actions applied.
pub fn fire_passives(
    ctx: &mut ResolveCtx<'_, '_>,
    holder: PlayerId,
    timing: PassiveTiming,
) -> Result<PassiveOutcome, ResolveError> {
    let limit = ctx.rules()?.max_trigger_depth;
    if ctx.depth() >= limit {
        tracing::error!(%holder, ?timing, depth = limit, "passive trigger chain too deep");
        return Err(ResolveError::TriggerChainTooDeep { depth: limit });
    }

    let heroes = ctx.heroes()?;
    let fired = triggered_passives(
        &ctx.state.player(holder).tokens,
        timing,
        ctx.state.turn.phase,
        heroes,
    )?;
    if fired.is_empty() {
        return Ok(PassiveOutcome::default());
    }

    ctx.enter_trigger();
    let outcome = apply_passives(ctx, holder, timing, &fired);
    ctx.leave_trigger();
    outcome
}

fn apply_passives(
    ctx: &mut ResolveCtx<'_, '_>,
    holder: PlayerId,
    timing: PassiveTiming,
    fired: &[TriggeredPassive<'_>],
) -> Result<PassiveOutcome, ResolveError> {
    let mut outcome = PassiveOutcome::default();

    for passive in fired {
        if ctx.state.is_over() {
            break;
        }
        tracing::debug!(
            %holder,
            token = %passive.token,
            ?timing,
            stacks = passive.stacks,
            "passive triggered"
        );
        ctx.emit(DomainEvent::PassiveTriggered {
            player: holder,
            token: passive.token.clone(),
            timing,
        });

        let scale = |amount: i64, per_stack: bool| {
            if per_stack {
                amount * i64::from(passive.stacks)
            } else {
                amount
            }
        };

        for action in &passive.trigger.actions {
            match action {
                PassiveAction::SkipPhase => outcome.skip_phase = true,
                PassiveAction::Damage { amount, per_stack } => {
                    let amount = scale(i64::from(*amount), *per_stack);
                    deal_direct(ctx, holder, u32::try_from(amount).unwrap_or(u32::MAX))?;
                }
                PassiveAction::ModifyStat {
                    stat,
                    delta,
                    per_stack,
                } => {
                    let delta = scale(i64::from(*delta), *per_stack);
                    match stat {
                        StatKind::Hp if delta >= 0 => {
                            heal(ctx, holder, u32::try_from(delta).unwrap_or(u32::MAX))
                        }
                        StatKind::Hp => {
                            lose_hp(ctx, holder, u32::try_from(-delta).unwrap_or(u32::MAX))
                        }
                        StatKind::Cp => change_cp(ctx, holder, delta)?,
                    }
                }
                PassiveAction::ExtraAttack => {
                    if ctx.state.turn.active == holder {
                        let turn = &mut ctx.state.turn;
                        turn.extra_attacks = turn.extra_attacks.saturating_add(1);
                    }
                }
                PassiveAction::Custom { action, params } => {
                    run_custom(ctx, &ActionScope::direct(holder), action, params, passive.stacks)?;
                }
            }
            if ctx.state.is_over() {
                break;
            }
        }

        if passive.trigger.auto_removes() {
            let change = ctx.state.player_mut(holder).tokens.remove_all(&passive.token);
            if change.before > 0 {
                ctx.emit(DomainEvent::TokenRemoved {
                    player: holder,
                    token: passive.token.clone(),
                    stacks: change.before,
                });
            }
        }
    }

    Ok(outcome)
}
