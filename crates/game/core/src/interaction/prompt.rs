//! Choices and bonus-die re-rolls raised by effects.

use crate::env::HeroOracle;
use crate::event::{DomainEvent, RollPurpose};
use crate::resolve::{ResolveCtx, ResolveError, apply_roll_outcomes, defer};
use crate::state::{MatchState, PlayerId, TokenId};
use crate::token::{ActiveUseEffect, ActiveUseTiming, LedgerError, usable_tokens};

use super::{Interaction, PendingBonusRoll, close, resume_with};

/// Whether `owner` holds a token that can pay for a bonus-die re-roll.
pub(crate) fn reroll_available(
    state: &MatchState,
    heroes: &dyn HeroOracle,
    owner: PlayerId,
) -> Result<bool, LedgerError> {
    Ok(usable_tokens(
        &state.player(owner).tokens,
        ActiveUseTiming::AfterBonusRoll,
        heroes,
    )?
    .into_iter()
    .any(|(_, active)| active.effect == ActiveUseEffect::RerollBonusDie))
}

/// Resolves the open choice with `option`, then runs the chosen actions
/// followed by whatever was queued behind the choice.
pub fn resolve_choice(ctx: &mut ResolveCtx<'_, '_>, option: usize) -> Result<(), ResolveError> {
    let owner = match &ctx.state.interaction.current {
        Some(Interaction::Choice(choice)) if option < choice.options.len() => choice.owner,
        _ => {
            tracing::warn!(option, "no open choice accepts this option");
            return Ok(());
        }
    };
    ctx.emit(DomainEvent::ChoiceResolved {
        player: owner,
        option,
    });
    let Some(Interaction::Choice(mut choice)) = close(ctx) else {
        return Ok(());
    };

    let mut actions = choice.options.swap_remove(option).actions;
    actions.append(&mut choice.followups);
    resume_with(ctx, &choice.scope, &actions)
}

/// Re-rolls one bonus die, paying with `token`.
pub fn reroll_bonus_die(
    ctx: &mut ResolveCtx<'_, '_>,
    index: usize,
    token: &TokenId,
) -> Result<(), ResolveError> {
    let owner = match &ctx.state.interaction.current {
        Some(Interaction::BonusDiceReroll(roll)) if index < roll.dice.len() => roll.owner,
        _ => {
            tracing::warn!(index, "no open bonus roll has this die");
            return Ok(());
        }
    };
    let definition = ctx.token(token)?;
    let Some(active) = definition
        .active_use_at(ActiveUseTiming::AfterBonusRoll)
        .filter(|active| active.effect == ActiveUseEffect::RerollBonusDie)
    else {
        tracing::warn!(%owner, %token, "token cannot re-roll bonus dice");
        return Ok(());
    };

    ctx.state.player_mut(owner).tokens.spend(token, active.cost)?;
    ctx.emit(DomainEvent::TokenUsed {
        player: owner,
        token: token.clone(),
        cost: active.cost,
    });

    let rolled = ctx.roll_dice(owner, 1)?;
    if let Some(Interaction::BonusDiceReroll(roll)) = ctx.state.interaction.current.as_mut()
        && let Some(die) = rolled.first()
    {
        tracing::debug!(
            %owner,
            index,
            from = roll.dice[index].value,
            to = die.value,
            "bonus die re-rolled"
        );
        roll.dice[index] = die.clone();
    }
    ctx.emit(DomainEvent::DiceRolled {
        player: owner,
        purpose: RollPurpose::BonusReroll,
        dice: rolled,
    });

    let heroes = ctx.heroes()?;
    if !reroll_available(ctx.state, heroes, owner)? {
        return finish_bonus_roll(ctx);
    }
    Ok(())
}

/// Accepts the bonus dice as they are and applies their outcomes.
pub fn finish_bonus_roll(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    if !matches!(
        ctx.state.interaction.current,
        Some(Interaction::BonusDiceReroll(_))
    ) {
        return Ok(());
    }
    let Some(Interaction::BonusDiceReroll(roll)) = close(ctx) else {
        return Ok(());
    };
    let PendingBonusRoll {
        dice,
        outcomes,
        scope,
        followups,
        ..
    } = roll;

    if apply_roll_outcomes(ctx, &scope, &dice, &outcomes)?.is_suspended() {
        defer(ctx, &followups);
        return Ok(());
    }
    resume_with(ctx, &scope, &followups)
}
