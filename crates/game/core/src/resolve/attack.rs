//! Attack resolution state machine.
//!
//! Stage order: attacker `PreDefense` effects, the defender's roll and its
//! effects, damage contributors, status modifiers, response windows, damage
//! application, riders and `PostDamage` effects, then attack-end cleanup.
//! Each stage persists in [`AttackState::stage`] before it runs anything that
//! can suspend, so [`drive`] can always resume where it left off.

use crate::ability::{AbilityEffect, AbilityKind, EffectTiming};
use crate::combat::apply_status_modifiers;
use crate::dice::{AbilityMatch, Die, TriggerContext, select_variant};
use crate::event::{DomainEvent, RollPurpose};
use crate::state::{AbilityId, AttackStage, AttackState, EffectCursor, Phase, PlayerId};
use crate::token::PassiveTiming;

use super::actions::{eval_condition, land_damage, run_actions};
use super::{ActionScope, Flow, ResolveCtx, ResolveError, fire_passives};

/// Timing groups in execution order.
const TIMING_ORDER: [EffectTiming; 4] = [
    EffectTiming::PreDefense,
    EffectTiming::WithDamage,
    EffectTiming::Immediate,
    EffectTiming::PostDamage,
];

/// Opens an attack with the matched offensive ability and runs it until it
/// finishes or suspends.
pub fn start_attack(
    ctx: &mut ResolveCtx<'_, '_>,
    attacker: PlayerId,
    matched: &AbilityMatch,
    dice: Vec<Die>,
) -> Result<(), ResolveError> {
    let ability = ctx.ability(attacker, &matched.ability)?;
    tracing::debug!(
        %attacker,
        ability = %matched.ability,
        variant = ?matched.variant,
        tags = ?ability.tags,
        "attack started"
    );
    ctx.emit(DomainEvent::AbilityActivated {
        player: attacker,
        ability: matched.ability.clone(),
        variant: matched.variant,
    });
    ctx.state.attack = Some(AttackState::new(
        attacker,
        matched.variant_ref(),
        ability.tags,
        dice,
    ));
    drive(ctx)
}

/// Advances the current attack until it completes, waits on the defender or
/// an interaction opens.
pub fn drive(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    loop {
        if ctx.state.is_over() || ctx.state.interaction.is_open() {
            return Ok(());
        }
        let Some(attack) = ctx.state.attack.as_ref() else {
            return Ok(());
        };
        let stage = attack.stage;
        tracing::trace!(?stage, "attack stage");

        match stage {
            AttackStage::PreDefense(cursor) => {
                let attacker = attack.attacker;
                let effects = ctx.variant_effects(attacker, &attack.ability)?;
                let plan = plan(effects, |effect| effect.timing == EffectTiming::PreDefense);
                let scope = ActionScope::direct(attacker).with_dice(attack.offense_dice.clone());
                if run_stage(ctx, &scope, effects, &plan, cursor, AttackStage::PreDefense)?
                    .is_suspended()
                {
                    return Ok(());
                }
                if !ctx.state.is_over() {
                    begin_defense(ctx)?;
                }
            }
            AttackStage::AwaitDefense => return Ok(()),
            AttackStage::DefenseEffects(cursor) => {
                if let Some(defense) = attack.defense.clone() {
                    let defender = attack.defender;
                    let effects = ctx.variant_effects(defender, &defense)?;
                    let plan = plan(effects, |_| true);
                    let scope =
                        ActionScope::direct(defender).with_dice(attack.defense_dice.clone());
                    if run_stage(ctx, &scope, effects, &plan, cursor, AttackStage::DefenseEffects)?
                        .is_suspended()
                    {
                        return Ok(());
                    }
                }
                set_stage(ctx, AttackStage::BuildDamage(EffectCursor::START));
            }
            AttackStage::BuildDamage(cursor) => {
                let attacker = attack.attacker;
                let effects = ctx.variant_effects(attacker, &attack.ability)?;
                let plan = plan(effects, AbilityEffect::is_contributor);
                let scope = ActionScope::contributing(attacker, attack.offense_dice.clone());
                if run_stage(ctx, &scope, effects, &plan, cursor, AttackStage::BuildDamage)?
                    .is_suspended()
                {
                    return Ok(());
                }
                apply_statuses(ctx)?;
                set_stage(ctx, AttackStage::Respond);
            }
            AttackStage::Respond => crate::interaction::advance_window(ctx)?,
            AttackStage::ApplyDamage => {
                apply_attack_damage(ctx)?;
                set_stage(ctx, AttackStage::Aftermath(EffectCursor::START));
            }
            AttackStage::Aftermath(cursor) => {
                let attacker = attack.attacker;
                let effects = ctx.variant_effects(attacker, &attack.ability)?;
                let plan = plan(effects, |effect| {
                    effect.timing != EffectTiming::PreDefense && !effect.is_contributor()
                });
                let scope = ActionScope::direct(attacker).with_dice(attack.offense_dice.clone());
                if run_stage(ctx, &scope, effects, &plan, cursor, AttackStage::Aftermath)?
                    .is_suspended()
                {
                    return Ok(());
                }
                set_stage(ctx, AttackStage::Finish);
            }
            AttackStage::Finish => return finish_attack(ctx),
        }
    }
}

/// Effect indices kept by `keep`, grouped by timing, declared order within a timing.
fn plan(effects: &[AbilityEffect], keep: impl Fn(&AbilityEffect) -> bool) -> Vec<usize> {
    TIMING_ORDER
        .iter()
        .flat_map(|timing| {
            effects
                .iter()
                .enumerate()
                .filter(move |(_, effect)| effect.timing == *timing)
                .map(|(index, _)| index)
        })
        .filter(|&index| keep(&effects[index]))
        .collect()
}

/// Runs `plan` from `cursor`, recording the resume point before every effect.
fn run_stage(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    effects: &[AbilityEffect],
    plan: &[usize],
    cursor: EffectCursor,
    resume: fn(EffectCursor) -> AttackStage,
) -> Result<Flow, ResolveError> {
    for position in cursor.next..plan.len() {
        if ctx.state.is_over() {
            break;
        }
        set_stage(ctx, resume(EffectCursor { next: position + 1 }));

        let effect = &effects[plan[position]];
        if let Some(condition) = &effect.condition
            && !eval_condition(ctx, scope, condition)
        {
            tracing::trace!(effect = %effect.description, ?condition, "effect skipped");
            continue;
        }
        tracing::trace!(effect = %effect.description, timing = %effect.timing, "effect applied");
        if run_actions(ctx, scope, std::slice::from_ref(&effect.action))?.is_suspended() {
            return Ok(Flow::Suspended);
        }
    }
    Ok(Flow::Continue)
}

fn set_stage(ctx: &mut ResolveCtx<'_, '_>, stage: AttackStage) {
    if let Some(attack) = ctx.state.attack.as_mut() {
        attack.stage = stage;
    }
}

// ===== defense =====

/// Sends the attack to the defender, or straight on to damage when the
/// attack cannot be defended.
pub fn begin_defense(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    let Some(attack) = ctx.state.attack.as_ref() else {
        return Ok(());
    };
    let defender = attack.defender;
    if attack.bypasses_defense() {
        tracing::debug!(%defender, "defense bypassed");
        set_stage(ctx, AttackStage::BuildDamage(EffectCursor::START));
        return Ok(());
    }

    let options = defensive_options(ctx, defender)?;
    if options.is_empty() {
        set_stage(ctx, AttackStage::BuildDamage(EffectCursor::START));
        return Ok(());
    }

    if let Some(attack) = ctx.state.attack.as_mut() {
        attack.stage = AttackStage::AwaitDefense;
        if let [only] = options.as_slice() {
            attack.defense_choice = Some(only.clone());
        }
    }

    ctx.state.turn.phase = Phase::DefensiveRoll;
    tracing::debug!(player = %defender, phase = %Phase::DefensiveRoll, "phase entered");
    ctx.emit(DomainEvent::PhaseEntered {
        player: defender,
        phase: Phase::DefensiveRoll,
    });
    let outcome = fire_passives(ctx, defender, PassiveTiming::OnPhaseEnter)?;
    if outcome.skip_phase {
        ctx.emit(DomainEvent::PhaseSkipped {
            player: defender,
            phase: Phase::DefensiveRoll,
        });
        set_stage(ctx, AttackStage::BuildDamage(EffectCursor::START));
    }
    Ok(())
}

/// Defensive abilities currently in `defender`'s loadout.
fn defensive_options(
    ctx: &ResolveCtx<'_, '_>,
    defender: PlayerId,
) -> Result<Vec<AbilityId>, ResolveError> {
    let hero = ctx.hero(defender)?;
    Ok(ctx
        .state
        .player(defender)
        .abilities
        .iter()
        .filter(|id| {
            hero.ability(id)
                .is_some_and(|ability| ability.kind == AbilityKind::Defensive)
        })
        .cloned()
        .collect())
}

/// Rolls the chosen defensive ability and resumes the attack.
pub fn roll_defense(ctx: &mut ResolveCtx<'_, '_>, defender: PlayerId) -> Result<(), ResolveError> {
    let choice = ctx
        .state
        .attack
        .as_ref()
        .and_then(|attack| attack.defense_choice.clone())
        .ok_or(ResolveError::AttackMissing { player: defender })?;
    let ability = ctx.ability(defender, &choice)?;
    let count = ability.defense_dice_count().unwrap_or_default();

    let dice = ctx.roll_dice(defender, usize::from(count))?;
    ctx.emit(DomainEvent::DiceRolled {
        player: defender,
        purpose: RollPurpose::Defensive,
        dice: dice.clone(),
    });

    let matched = select_variant(ability, &TriggerContext::new(&dice, Phase::DefensiveRoll))?;
    if let Some(matched) = &matched {
        tracing::debug!(
            %defender,
            ability = %matched.ability,
            variant = ?matched.variant,
            "defense resolved"
        );
        ctx.emit(DomainEvent::AbilityActivated {
            player: defender,
            ability: matched.ability.clone(),
            variant: matched.variant,
        });
    }

    if let Some(attack) = ctx.state.attack.as_mut() {
        attack.defense_dice = dice;
        attack.defense = matched.map(|matched| matched.variant_ref());
        attack.stage = AttackStage::DefenseEffects(EffectCursor::START);
    }
    drive(ctx)
}

// ===== damage =====

fn apply_statuses(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    let heroes = ctx.heroes()?;
    let state = &mut *ctx.state;
    let Some(attack) = state.attack.as_mut() else {
        return Ok(());
    };
    let applied = apply_status_modifiers(
        &mut attack.pending,
        &state.players[attack.attacker.index()].tokens,
        &state.players[attack.defender.index()].tokens,
        heroes,
    )?;
    if !applied.is_empty() {
        tracing::debug!(
            ?applied,
            current = attack.pending.current(),
            "status modifiers applied"
        );
    }
    Ok(())
}

fn apply_attack_damage(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    let Some(attack) = ctx.state.attack.as_ref() else {
        return Ok(());
    };
    let defender = attack.defender;
    let ignore_shields = attack.ignores_shields();
    let mut pending = attack.pending.clone();

    let shield = ctx.state.player(defender).shield;
    let resolution = pending.finalize(shield, ignore_shields);
    if resolution.absorbed > 0 {
        ctx.state.player_mut(defender).shield = 0;
        tracing::debug!(%defender, absorbed = resolution.absorbed, "shield consumed");
    }

    let pending = if pending.original() == 0 && !pending.is_evaded() {
        pending
    } else {
        land_damage(ctx, defender, pending, false)?
    };
    if let Some(attack) = ctx.state.attack.as_mut() {
        attack.pending = pending;
    }
    Ok(())
}

fn finish_attack(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    let Some(attack) = ctx.state.attack.as_ref() else {
        return Ok(());
    };
    let attacker = attack.attacker;
    let defender = attack.defender;
    let ability = attack.ability.ability.clone();
    let damage = attack.pending.dealt();
    let evaded = attack.pending.is_evaded();

    for player in PlayerId::all() {
        ctx.state.player_mut(player).shield = 0;
    }
    tracing::debug!(%attacker, %defender, %ability, damage, evaded, "attack resolved");
    ctx.emit(DomainEvent::AttackResolved {
        attacker,
        defender,
        ability,
        damage,
        evaded,
    });

    for player in [attacker, defender] {
        if ctx.state.is_over() {
            break;
        }
        fire_passives(ctx, player, PassiveTiming::OnAttackEnd)?;
    }
    ctx.state.attack = None;
    if ctx.state.is_over() {
        return Ok(());
    }

    if ctx.state.turn.extra_attacks > 0 {
        ctx.state.turn.extra_attacks -= 1;
        tracing::debug!(
            player = %attacker,
            remaining = ctx.state.turn.extra_attacks,
            "extra attack"
        );
        crate::engine::enter_phase(ctx, Phase::OffensiveRoll)
    } else {
        crate::engine::enter_phase(ctx, Phase::Main2)
    }
}
