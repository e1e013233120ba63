//! Phase flow of a turn.
//!
//! Automatic phases (`Upkeep`, `Income`, `Discard`) run back to back until a
//! phase that waits for the active player is reached. Passive `SkipPhase`
//! actions make the flow jump straight to the following phase.

use crate::event::DomainEvent;
use crate::resolve::{ResolveCtx, ResolveError, change_cp, draw_cards, fire_passives};
use crate::state::{DiceTray, Phase, PlayerId};
use crate::token::PassiveTiming;

/// Upper bound on phases walked by one call; a full turn and a half.
const MAX_PHASE_STEPS: usize = 32;

/// Enters `phase` for the active player and keeps going through automatic
/// or skipped phases, across turn boundaries, until one waits for input.
pub(crate) fn enter_phase(ctx: &mut ResolveCtx<'_, '_>, phase: Phase) -> Result<(), ResolveError> {
    let mut phase = phase;
    for _ in 0..MAX_PHASE_STEPS {
        if ctx.state.is_over() {
            return Ok(());
        }
        let active = ctx.state.turn.active;

        if phase == Phase::Income && skips_income(ctx, active)? {
            tracing::debug!(player = %active, "first turn income skipped");
            ctx.emit(DomainEvent::PhaseSkipped {
                player: active,
                phase,
            });
            phase = following(ctx, phase);
            continue;
        }

        ctx.state.turn.phase = phase;
        tracing::debug!(
            player = %active,
            %phase,
            turn = ctx.state.turn.turn_number,
            "phase entered"
        );
        ctx.emit(DomainEvent::PhaseEntered {
            player: active,
            phase,
        });

        let mut skip = false;
        if phase == Phase::Upkeep {
            skip |= fire_passives(ctx, active, PassiveTiming::OnTurnStart)?.skip_phase;
        }
        if !ctx.state.is_over() {
            skip |= fire_passives(ctx, active, PassiveTiming::OnPhaseEnter)?.skip_phase;
        }
        if ctx.state.is_over() {
            return Ok(());
        }
        if skip {
            tracing::debug!(player = %active, %phase, "phase skipped");
            ctx.emit(DomainEvent::PhaseSkipped {
                player: active,
                phase,
            });
            phase = following(ctx, phase);
            continue;
        }

        match phase {
            Phase::Upkeep | Phase::Discard => {}
            Phase::Income => {
                let income = ctx.rules()?.income_cp;
                change_cp(ctx, active, i64::from(income))?;
                draw_cards(ctx, active, 1)?;
            }
            Phase::OffensiveRoll => {
                let attempts = ctx.rules()?.offensive_roll_attempts;
                ctx.state.turn.tray = DiceTray::new(active, attempts);
                return Ok(());
            }
            Phase::Main1 | Phase::Main2 | Phase::DefensiveRoll => return Ok(()),
        }
        phase = following(ctx, phase);
    }

    tracing::error!(steps = MAX_PHASE_STEPS, "phase flow did not settle");
    Err(ResolveError::PhaseLoop {
        steps: MAX_PHASE_STEPS,
    })
}

/// Fires `OnOffensiveRollEnd` for the active player.
pub(crate) fn leave_offensive_roll(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    let active = ctx.state.turn.active;
    fire_passives(ctx, active, PassiveTiming::OnOffensiveRollEnd)?;
    Ok(())
}

fn skips_income(ctx: &ResolveCtx<'_, '_>, active: PlayerId) -> Result<bool, ResolveError> {
    Ok(ctx.rules()?.first_player_skips_income
        && active == PlayerId::FIRST
        && ctx.state.turn.turn_number == 1)
}

/// Next phase on the track, ending the turn after `Discard`.
fn following(ctx: &mut ResolveCtx<'_, '_>, phase: Phase) -> Phase {
    match phase.next() {
        Some(next) => next,
        None => {
            end_turn(ctx);
            Phase::Upkeep
        }
    }
}

fn end_turn(ctx: &mut ResolveCtx<'_, '_>) {
    let turn = &mut ctx.state.turn;
    let next = turn.active.opponent();
    tracing::debug!(ended = %turn.active, next = %next, turn = turn.turn_number, "turn ended");
    turn.active = next;
    turn.turn_number += 1;
    turn.extra_attacks = 0;
    turn.tray = DiceTray::new(next, 0);
}
