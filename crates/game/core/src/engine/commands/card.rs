use crate::ability::{CardDefinition, EffectAction};
use crate::engine::command::PlayCard;
use crate::engine::errors::CommandError;
use crate::engine::transition::{CommandTransition, hero_of};
use crate::env::GameEnv;
use crate::event::DomainEvent;
use crate::resolve::{ActionScope, ResolveCtx, change_cp, run_actions};
use crate::state::{MatchState, PlayerId};

use super::require_no_attack;

impl PlayCard {
    fn definition<'e>(
        &self,
        player: PlayerId,
        state: &MatchState,
        env: &GameEnv<'e>,
    ) -> Result<&'e CardDefinition, CommandError> {
        hero_of(state, env, player)?
            .card(&self.card)
            .ok_or_else(|| CommandError::CardNotInHand(self.card.clone()))
    }
}

impl CommandTransition for PlayCard {
    fn pre_validate(
        &self,
        player: PlayerId,
        state: &MatchState,
        env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        require_no_attack(state)?;
        let seat = state.player(player);
        if !seat.hand.contains(&self.card) {
            return Err(CommandError::CardNotInHand(self.card.clone()));
        }
        let card = self.definition(player, state, env)?;

        let phase = state.turn.phase;
        if !card.playable_in.contains(&phase) {
            return Err(CommandError::CardNotPlayable {
                card: self.card.clone(),
                phase,
            });
        }
        if seat.cp < card.cp_cost {
            return Err(CommandError::InsufficientCp {
                have: seat.cp,
                need: card.cp_cost,
            });
        }
        // Upgrades must name an ability the player still holds.
        for action in &card.effects {
            if let EffectAction::ReplaceAbility { from, .. } = action
                && !seat.has_ability(from)
            {
                return Err(CommandError::AbilityNotOwned(from.clone()));
            }
        }
        Ok(())
    }

    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        let card = self.definition(player, ctx.state, &ctx.env)?;
        change_cp(ctx, player, -i64::from(card.cp_cost))?;

        let seat = ctx.state.player_mut(player);
        if let Some(position) = seat.hand.iter().position(|held| held == &self.card) {
            let played = seat.hand.remove(position);
            seat.discard.push(played);
        }
        tracing::debug!(%player, card = %self.card, cost = card.cp_cost, "card played");
        ctx.emit(DomainEvent::CardPlayed {
            player,
            card: self.card.clone(),
        });

        run_actions(ctx, &ActionScope::direct(player), &card.effects)?;
        Ok(())
    }
}
