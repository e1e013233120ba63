use crate::engine::command::{AdvancePhase, PayRemovalCost};
use crate::engine::errors::CommandError;
use crate::engine::transition::CommandTransition;
use crate::engine::turns::{enter_phase, leave_offensive_roll};
use crate::env::GameEnv;
use crate::event::DomainEvent;
use crate::resolve::{ResolveCtx, ResolveError, change_cp};
use crate::state::{MatchState, Phase, PlayerId};

use super::{require_no_attack, require_phase};

impl CommandTransition for AdvancePhase {
    fn pre_validate(
        &self,
        _player: PlayerId,
        state: &MatchState,
        _env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        require_no_attack(state)?;
        require_phase(state, &[Phase::Main1, Phase::OffensiveRoll, Phase::Main2])
    }

    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        let from = ctx.state.turn.phase;
        tracing::debug!(%player, %from, "phase advanced");
        if from == Phase::OffensiveRoll {
            leave_offensive_roll(ctx)?;
        }
        if let Some(next) = from.next() {
            enter_phase(ctx, next)?;
        }
        Ok(())
    }
}

impl CommandTransition for PayRemovalCost {
    fn pre_validate(
        &self,
        player: PlayerId,
        state: &MatchState,
        env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        let seat = state.player(player);
        if seat.tokens.stacks(&self.token) == 0 {
            return Err(CommandError::InsufficientStacks {
                token: self.token.clone(),
                have: 0,
                need: 1,
            });
        }
        let heroes = env.heroes().map_err(ResolveError::from)?;
        let Some(cost) = heroes
            .token(&self.token)
            .and_then(|definition| definition.passive_trigger.as_ref())
            .filter(|trigger| trigger.removable)
            .and_then(|trigger| trigger.removal_cost)
        else {
            return Err(CommandError::NotRemovable(self.token.clone()));
        };
        if seat.cp < cost {
            return Err(CommandError::InsufficientCp {
                have: seat.cp,
                need: cost,
            });
        }
        Ok(())
    }

    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        let cost = ctx
            .token(&self.token)?
            .passive_trigger
            .as_ref()
            .and_then(|trigger| trigger.removal_cost)
            .unwrap_or_default();
        change_cp(ctx, player, -i64::from(cost))?;

        let change = ctx.state.player_mut(player).tokens.remove_all(&self.token);
        tracing::debug!(
            %player,
            token = %self.token,
            cost,
            stacks = change.before,
            "removal cost paid"
        );
        ctx.emit(DomainEvent::TokenRemoved {
            player,
            token: self.token.clone(),
            stacks: change.before,
        });
        Ok(())
    }
}
