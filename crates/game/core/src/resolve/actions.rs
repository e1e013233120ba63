//! Interpreter for the declarative action vocabulary.

use std::collections::BTreeMap;

use crate::ability::{Amount, ChoiceOption, EffectAction, EffectCondition, RollOutcome, Target};
use crate::combat::{ModificationSource, PendingDamage};
use crate::dice::{Die, count_symbol};
use crate::env::shuffle;
use crate::event::{DomainEvent, RollPurpose};
use crate::interaction::{self, Interaction, PendingBonusRoll, PendingChoice};
use crate::registry::{CustomActionContext, CustomDelta};
use crate::state::{AbilityId, CustomActionId, PlayerId, TokenId};
use crate::token::PassiveTiming;

use super::{ActionScope, DamageMode, Flow, ResolveCtx, ResolveError, fire_passives};

/// Runs `actions` in order. When one of them suspends, the remainder is
/// queued behind the interaction that suspended it.
pub fn run_actions(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    actions: &[EffectAction],
) -> Result<Flow, ResolveError> {
    for (index, action) in actions.iter().enumerate() {
        if ctx.state.is_over() {
            break;
        }
        if apply_action(ctx, scope, action)?.is_suspended() {
            defer(ctx, &actions[index + 1..]);
            return Ok(Flow::Suspended);
        }
    }
    Ok(Flow::Continue)
}

/// Appends `rest` to the follow-up queue of the open interaction.
pub(crate) fn defer(ctx: &mut ResolveCtx<'_, '_>, rest: &[EffectAction]) {
    if rest.is_empty() {
        return;
    }
    match ctx
        .state
        .interaction
        .current
        .as_mut()
        .and_then(Interaction::followups_mut)
    {
        Some(followups) => followups.extend(rest.iter().cloned()),
        None => tracing::warn!(
            dropped = rest.len(),
            "no interaction to queue follow-up actions on"
        ),
    }
}

fn apply_action(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    action: &EffectAction,
) -> Result<Flow, ResolveError> {
    tracing::trace!(actor = %scope.actor, action = action.as_ref(), "applying action");
    match action {
        EffectAction::Damage { amount } => {
            let amount = eval_amount(ctx, scope, amount);
            match scope.mode {
                DamageMode::Contribute => contribute(ctx, scope.actor, amount)?,
                DamageMode::Direct => deal_direct(ctx, scope.actor.opponent(), amount)?,
            }
        }
        EffectAction::Heal { amount, target } => {
            let amount = eval_amount(ctx, scope, amount);
            heal(ctx, scope.target(*target), amount);
        }
        EffectAction::GrantToken {
            token,
            amount,
            target,
        } => grant_token(ctx, scope.target(*target), token, *amount)?,
        EffectAction::GrantStatus {
            token,
            stacks,
            target,
        } => grant_token(ctx, scope.target(*target), token, *stacks)?,
        EffectAction::GrantDamageShield { amount, target } => {
            let amount = eval_amount(ctx, scope, amount);
            add_shield(ctx, scope.target(*target), amount);
        }
        EffectAction::DrawCard { count } => draw_cards(ctx, scope.actor, *count)?,
        EffectAction::RollDie { count, outcomes } => {
            return roll_bonus_dice(ctx, scope, *count, outcomes);
        }
        EffectAction::Choice { options } => return offer_choice(ctx, scope, options),
        EffectAction::Custom { action, params } => run_custom(ctx, scope, action, params, 0)?,
        EffectAction::ReplaceAbility { from, to } => replace_ability(ctx, scope.actor, from, to),
    }
    Ok(Flow::Continue)
}

// ===== value and condition evaluation =====

pub fn eval_amount(ctx: &ResolveCtx<'_, '_>, scope: &ActionScope, amount: &Amount) -> u32 {
    match amount {
        Amount::Fixed(value) => *value,
        Amount::PerSymbol { symbol, each } => count_symbol(&scope.dice, symbol) * each,
        Amount::PerTokenStack { token, each } => {
            u32::from(ctx.state.player(scope.actor).tokens.stacks(token)) * each
        }
    }
}

/// Evaluated against the attack's damage as it stands right now; outside an
/// attack, damage conditions are never met.
pub fn eval_condition(
    ctx: &ResolveCtx<'_, '_>,
    scope: &ActionScope,
    condition: &EffectCondition,
) -> bool {
    let pending = ctx.state.attack.as_ref().map(|attack| &attack.pending);
    match condition {
        EffectCondition::OnHit => pending.is_some_and(PendingDamage::is_hit),
        EffectCondition::OnMiss => pending.is_some_and(|pending| !pending.is_hit()),
        EffectCondition::MinDamage(min) => pending.is_some_and(|pending| pending.dealt() >= *min),
        EffectCondition::SelfHasToken { token, stacks } => {
            ctx.state.player(scope.actor).tokens.has(token, *stacks)
        }
        EffectCondition::OpponentHasToken { token, stacks } => ctx
            .state
            .player(scope.actor.opponent())
            .tokens
            .has(token, *stacks),
    }
}

// ===== damage =====

fn contribute(
    ctx: &mut ResolveCtx<'_, '_>,
    actor: PlayerId,
    amount: u32,
) -> Result<(), ResolveError> {
    let attack = ctx
        .state
        .attack
        .as_mut()
        .ok_or(ResolveError::AttackMissing { player: actor })?;
    attack.pending.add_base(amount);
    tracing::trace!(amount, current = attack.pending.current(), "damage contributed");
    Ok(())
}

/// Damage outside the attack pipeline: no modifiers, windows or shields.
pub fn deal_direct(
    ctx: &mut ResolveCtx<'_, '_>,
    target: PlayerId,
    amount: u32,
) -> Result<(), ResolveError> {
    if amount == 0 {
        return Ok(());
    }
    land_damage(ctx, target, PendingDamage::direct(amount), true).map(|_| ())
}

/// Emits the damage event, lets `OnDamageReceived` passives intercept the
/// finalized amount, then reduces HP.
pub(crate) fn land_damage(
    ctx: &mut ResolveCtx<'_, '_>,
    target: PlayerId,
    pending: PendingDamage,
    direct: bool,
) -> Result<PendingDamage, ResolveError> {
    let announced = pending.dealt();
    ctx.emit(DomainEvent::DamageDealt {
        target,
        original: pending.original(),
        final_amount: announced,
        direct,
    });

    let pending = if announced > 0 {
        ctx.push_in_flight(target, pending);
        let fired = fire_passives(ctx, target, PassiveTiming::OnDamageReceived);
        let pending = ctx.pop_in_flight().unwrap_or_default();
        fired?;
        pending
    } else {
        pending
    };

    let dealt = pending.dealt();
    if dealt < announced {
        ctx.emit(DomainEvent::DamagePrevented {
            target,
            amount: announced - dealt,
        });
    }
    if dealt > 0 {
        let lost = ctx.state.player_mut(target).lose_hp(dealt);
        tracing::debug!(%target, lost, hp = ctx.state.player(target).hp, direct, "damage landed");
        check_defeat(ctx, target);
    }
    Ok(pending)
}

pub(crate) fn check_defeat(ctx: &mut ResolveCtx<'_, '_>, player: PlayerId) {
    if ctx.state.winner.is_some() || !ctx.state.player(player).is_defeated() {
        return;
    }
    let winner = player.opponent();
    ctx.state.winner = Some(winner);
    tracing::info!(%winner, defeated = %player, "match decided");
    ctx.emit(DomainEvent::PlayerDefeated { player });
}

// ===== player resources =====

pub(crate) fn heal(ctx: &mut ResolveCtx<'_, '_>, player: PlayerId, amount: u32) {
    let healed = ctx.state.player_mut(player).heal(amount);
    if healed > 0 {
        ctx.emit(DomainEvent::Healed {
            player,
            amount: healed,
        });
    }
}

pub(crate) fn lose_hp(ctx: &mut ResolveCtx<'_, '_>, player: PlayerId, amount: u32) {
    let lost = ctx.state.player_mut(player).lose_hp(amount);
    if lost > 0 {
        ctx.emit(DomainEvent::HpLost {
            player,
            amount: lost,
        });
        check_defeat(ctx, player);
    }
}

pub(crate) fn change_cp(
    ctx: &mut ResolveCtx<'_, '_>,
    player: PlayerId,
    delta: i64,
) -> Result<(), ResolveError> {
    let max_cp = ctx.rules()?.max_cp;
    let (before, after) = ctx.state.player_mut(player).adjust_cp(delta, max_cp);
    if before != after {
        ctx.emit(DomainEvent::CpChanged {
            player,
            before,
            after,
        });
    }
    Ok(())
}

fn add_shield(ctx: &mut ResolveCtx<'_, '_>, player: PlayerId, amount: u32) {
    if amount == 0 {
        return;
    }
    let seat = ctx.state.player_mut(player);
    seat.shield = seat.shield.saturating_add(amount);
    let total = seat.shield;
    ctx.emit(DomainEvent::ShieldGranted {
        player,
        amount,
        total,
    });
}

pub(crate) fn grant_token(
    ctx: &mut ResolveCtx<'_, '_>,
    player: PlayerId,
    token: &TokenId,
    amount: u8,
) -> Result<(), ResolveError> {
    let definition = ctx.token(token)?;
    let change = ctx.state.player_mut(player).tokens.grant(definition, amount);
    if change.is_noop() {
        tracing::trace!(%player, %token, stacks = change.after, "grant clamped at stack limit");
        return Ok(());
    }
    ctx.emit(DomainEvent::TokenGranted {
        player,
        token: token.clone(),
        before: change.before,
        after: change.after,
    });
    Ok(())
}

fn remove_token(
    ctx: &mut ResolveCtx<'_, '_>,
    player: PlayerId,
    token: &TokenId,
    amount: Option<u8>,
) {
    let ledger = &mut ctx.state.player_mut(player).tokens;
    match amount {
        Some(amount) => {
            let change = ledger.consume(token, amount);
            if !change.is_noop() {
                ctx.emit(DomainEvent::TokenConsumed {
                    player,
                    token: token.clone(),
                    before: change.before,
                    after: change.after,
                });
            }
        }
        None => {
            let change = ledger.remove_all(token);
            if change.before > 0 {
                ctx.emit(DomainEvent::TokenRemoved {
                    player,
                    token: token.clone(),
                    stacks: change.before,
                });
            }
        }
    }
}

/// Draws from the top of the deck, reshuffling the discard pile when empty.
pub(crate) fn draw_cards(
    ctx: &mut ResolveCtx<'_, '_>,
    player: PlayerId,
    count: u8,
) -> Result<(), ResolveError> {
    for _ in 0..count {
        if ctx.state.player(player).deck.is_empty() {
            let mut cards = std::mem::take(&mut ctx.state.player_mut(player).discard);
            if cards.is_empty() {
                tracing::debug!(%player, "nothing left to draw");
                break;
            }
            shuffle(&mut *ctx.rng, &mut cards);
            let reshuffled = cards.len();
            ctx.state.player_mut(player).deck = cards;
            ctx.emit(DomainEvent::DeckReshuffled {
                player,
                cards: reshuffled,
            });
        }
        let seat = ctx.state.player_mut(player);
        let Some(card) = seat.deck.pop() else {
            break;
        };
        seat.hand.push(card.clone());
        ctx.emit(DomainEvent::CardDrawn { player, card });
    }
    Ok(())
}

fn replace_ability(
    ctx: &mut ResolveCtx<'_, '_>,
    player: PlayerId,
    from: &AbilityId,
    to: &AbilityId,
) {
    let seat = ctx.state.player_mut(player);
    let Some(slot) = seat.abilities.iter().position(|held| held == from) else {
        tracing::warn!(%player, %from, %to, "upgrade skipped: ability not held");
        return;
    };
    let level = seat.ability_level(from).saturating_add(1);
    seat.abilities[slot] = to.clone();
    seat.ability_levels.remove(from);
    seat.ability_levels.insert(to.clone(), level);
    tracing::debug!(%player, %from, %to, level, "ability replaced");
    ctx.emit(DomainEvent::AbilityReplaced {
        player,
        from: from.clone(),
        to: to.clone(),
        level,
    });
}

// ===== nested sub-protocols =====

fn roll_bonus_dice(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    count: u8,
    outcomes: &[RollOutcome],
) -> Result<Flow, ResolveError> {
    let dice = ctx.roll_dice(scope.actor, usize::from(count))?;
    ctx.emit(DomainEvent::DiceRolled {
        player: scope.actor,
        purpose: RollPurpose::Bonus,
        dice: dice.clone(),
    });

    let heroes = ctx.heroes()?;
    if interaction::reroll_available(ctx.state, heroes, scope.actor)? {
        interaction::open(
            ctx,
            Interaction::BonusDiceReroll(PendingBonusRoll {
                owner: scope.actor,
                dice,
                outcomes: outcomes.to_vec(),
                scope: scope.clone(),
                followups: Vec::new(),
            }),
        );
        return Ok(Flow::Suspended);
    }
    apply_roll_outcomes(ctx, scope, &dice, outcomes)
}

/// Applies, die by die, the outcomes whose face matches.
pub(crate) fn apply_roll_outcomes(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    dice: &[Die],
    outcomes: &[RollOutcome],
) -> Result<Flow, ResolveError> {
    let actions: Vec<EffectAction> = dice
        .iter()
        .flat_map(|die| {
            outcomes
                .iter()
                .filter(move |outcome| outcome.face == die.symbol)
                .flat_map(|outcome| outcome.actions.iter().cloned())
        })
        .collect();
    run_actions(ctx, scope, &actions)
}

fn offer_choice(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    options: &[ChoiceOption],
) -> Result<Flow, ResolveError> {
    match options {
        [] => {
            tracing::warn!(actor = %scope.actor, "choice without options skipped");
            Ok(Flow::Continue)
        }
        [only] => run_actions(ctx, scope, &only.actions),
        _ => {
            interaction::open(
                ctx,
                Interaction::Choice(PendingChoice {
                    owner: scope.actor,
                    options: options.to_vec(),
                    scope: scope.clone(),
                    followups: Vec::new(),
                }),
            );
            Ok(Flow::Suspended)
        }
    }
}

// ===== custom actions =====

/// Dispatches to the registry and applies the returned deltas.
pub fn run_custom(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    action: &CustomActionId,
    params: &BTreeMap<String, i32>,
    stacks: u8,
) -> Result<(), ResolveError> {
    let registry = ctx.env.registry()?;
    let Some(entry) = registry.get(action) else {
        tracing::error!(%action, actor = %scope.actor, "custom action is not registered");
        return Err(ResolveError::UnknownCustomAction(action.clone()));
    };

    let deltas = {
        let pending = ctx
            .in_flight
            .last()
            .map(|(_, pending)| pending)
            .or_else(|| ctx.state.attack.as_ref().map(|attack| &attack.pending));
        let mut handler_ctx = CustomActionContext {
            actor: scope.actor,
            opponent: scope.actor.opponent(),
            state: &*ctx.state,
            pending,
            dice: &scope.dice,
            stacks,
            params,
            rng: &mut *ctx.rng,
        };
        entry.handler.handle(&mut handler_ctx).map_err(|source| {
            tracing::error!(%action, error = %source, "custom action failed");
            ResolveError::Handler {
                action: action.clone(),
                source,
            }
        })?
    };

    tracing::trace!(%action, deltas = deltas.len(), "custom action resolved");
    for delta in deltas {
        apply_delta(ctx, scope, action, delta)?;
    }
    Ok(())
}

fn apply_delta(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    action: &CustomActionId,
    delta: CustomDelta,
) -> Result<(), ResolveError> {
    match delta {
        CustomDelta::Damage { target, amount } => {
            if scope.mode == DamageMode::Contribute && target == Target::Opponent {
                contribute(ctx, scope.actor, amount)?;
            } else {
                deal_direct(ctx, scope.target(target), amount)?;
            }
        }
        CustomDelta::Heal { target, amount } => heal(ctx, scope.target(target), amount),
        CustomDelta::GrantToken {
            target,
            token,
            amount,
        } => grant_token(ctx, scope.target(target), &token, amount)?,
        CustomDelta::RemoveToken {
            target,
            token,
            amount,
        } => remove_token(ctx, scope.target(target), &token, amount),
        CustomDelta::GainCp { target, amount } => {
            change_cp(ctx, scope.target(target), i64::from(amount))?
        }
        CustomDelta::Shield { target, amount } => add_shield(ctx, scope.target(target), amount),
        CustomDelta::ModifyPendingDamage { delta } => pending_for(ctx, action)?
            .apply_modifier(ModificationSource::Custom(action.clone()), delta),
        CustomDelta::EvadePendingDamage => {
            pending_for(ctx, action)?.evade(ModificationSource::Custom(action.clone()))
        }
        CustomDelta::PreventDamage { amount } => {
            let prevented = pending_for(ctx, action)?.prevent(amount);
            tracing::trace!(%action, prevented, "damage prevented");
        }
    }
    Ok(())
}

fn pending_for<'c>(
    ctx: &'c mut ResolveCtx<'_, '_>,
    action: &CustomActionId,
) -> Result<&'c mut PendingDamage, ResolveError> {
    ctx.pending_mut()
        .ok_or_else(|| ResolveError::PendingDamageUnavailable {
            action: action.clone(),
        })
}
