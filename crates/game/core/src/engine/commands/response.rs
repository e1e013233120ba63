use crate::engine::command::{RerollBonusDie, ResolveChoice, SkipWindow, UseToken};
use crate::engine::errors::CommandError;
use crate::engine::transition::CommandTransition;
use crate::env::GameEnv;
use crate::event::InteractionKind;
use crate::interaction::{
    self, Interaction, reroll_bonus_die, resolve_choice, spend_window_token, window_tokens,
};
use crate::resolve::{ResolveCtx, ResolveError};
use crate::state::{MatchState, PlayerId, TokenId};
use crate::token::{ActiveUseEffect, ActiveUseTiming};

use super::open_interaction;

fn insufficient(state: &MatchState, player: PlayerId, token: &TokenId, need: u8) -> CommandError {
    CommandError::InsufficientStacks {
        token: token.clone(),
        have: state.player(player).tokens.stacks(token),
        need,
    }
}

impl CommandTransition for UseToken {
    fn pre_validate(
        &self,
        player: PlayerId,
        state: &MatchState,
        env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        let Some(Interaction::ResponseWindow { kind, .. }) = &state.interaction.current else {
            return Err(CommandError::TokenNotUsable(self.token.clone()));
        };
        let heroes = env.heroes().map_err(ResolveError::from)?;
        let usable = window_tokens(state, heroes, *kind).map_err(ResolveError::from)?;
        if usable.iter().any(|(definition, _)| definition.id == self.token) {
            return Ok(());
        }

        let cost = heroes
            .token(&self.token)
            .and_then(|definition| definition.active_use_at(kind.timing()))
            .map(|active| active.cost);
        match cost {
            Some(cost) if state.player(player).tokens.stacks(&self.token) < cost => {
                Err(insufficient(state, player, &self.token, cost))
            }
            _ => Err(CommandError::TokenNotUsable(self.token.clone())),
        }
    }

    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        spend_window_token(ctx, player, &self.token)?;
        Ok(())
    }
}

impl CommandTransition for RerollBonusDie {
    fn pre_validate(
        &self,
        player: PlayerId,
        state: &MatchState,
        env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        let Interaction::BonusDiceReroll(roll) =
            open_interaction(state, InteractionKind::BonusDiceReroll)?
        else {
            return Err(CommandError::WrongInteraction {
                expected: InteractionKind::BonusDiceReroll,
            });
        };
        let index = usize::from(self.index);
        if index >= roll.dice.len() {
            return Err(CommandError::DieOutOfRange { index });
        }

        let heroes = env.heroes().map_err(ResolveError::from)?;
        let Some(active) = heroes
            .token(&self.token)
            .and_then(|definition| definition.active_use_at(ActiveUseTiming::AfterBonusRoll))
            .filter(|active| active.effect == ActiveUseEffect::RerollBonusDie)
        else {
            return Err(CommandError::TokenNotUsable(self.token.clone()));
        };
        if state.player(player).tokens.stacks(&self.token) < active.cost {
            return Err(insufficient(state, player, &self.token, active.cost));
        }
        Ok(())
    }

    fn apply(&self, _player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        reroll_bonus_die(ctx, usize::from(self.index), &self.token)?;
        Ok(())
    }
}

impl CommandTransition for ResolveChoice {
    fn pre_validate(
        &self,
        _player: PlayerId,
        state: &MatchState,
        _env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        match open_interaction(state, InteractionKind::Choice)? {
            Interaction::Choice(choice) if self.option < choice.options.len() => Ok(()),
            _ => Err(CommandError::OptionOutOfRange {
                option: self.option,
            }),
        }
    }

    fn apply(&self, _player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        resolve_choice(ctx, self.option)?;
        Ok(())
    }
}

impl CommandTransition for SkipWindow {
    fn pre_validate(
        &self,
        _player: PlayerId,
        state: &MatchState,
        _env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        match state.interaction.kind() {
            Some(InteractionKind::Choice) => Err(CommandError::CannotSkipChoice),
            Some(_) => Ok(()),
            None => Err(CommandError::WrongInteraction {
                expected: InteractionKind::DefenderMitigation,
            }),
        }
    }

    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        tracing::debug!(%player, kind = ?ctx.state.interaction.kind(), "interaction skipped");
        interaction::skip(ctx)?;
        Ok(())
    }
}
