use crate::config::RulesConfig;
use crate::engine::command::{RollDice, ToggleDieLock};
use crate::engine::errors::CommandError;
use crate::engine::transition::CommandTransition;
use crate::env::GameEnv;
use crate::event::{DomainEvent, RollPurpose};
use crate::resolve::{ResolveCtx, roll_defense};
use crate::state::{MatchState, Phase, PlayerId};

use super::{awaiting_defense, require_no_attack, require_phase};

impl CommandTransition for RollDice {
    fn pre_validate(
        &self,
        player: PlayerId,
        state: &MatchState,
        _env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        if awaiting_defense(state, player) {
            let chosen = state
                .attack
                .as_ref()
                .is_some_and(|attack| attack.defense_choice.is_some());
            return if chosen {
                Ok(())
            } else {
                Err(CommandError::DefenseNotChosen)
            };
        }

        require_no_attack(state)?;
        require_phase(state, &[Phase::OffensiveRoll])?;
        if state.turn.tray.rolls_left == 0 {
            return Err(CommandError::NoRollsLeft);
        }
        Ok(())
    }

    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        if awaiting_defense(ctx.state, player) {
            roll_defense(ctx, player)?;
            return Ok(());
        }

        let tray = &ctx.state.turn.tray;
        let slots: Vec<usize> = if tray.has_rolled() {
            (0..tray.dice.len()).filter(|&index| !tray.is_locked(index)).collect()
        } else {
            (0..RulesConfig::MAX_DICE).collect()
        };

        let rolled = ctx.roll_dice(player, slots.len())?;
        let tray = &mut ctx.state.turn.tray;
        if tray.has_rolled() {
            for (index, die) in slots.into_iter().zip(rolled) {
                tray.dice[index] = die;
            }
        } else {
            tray.dice.extend(rolled);
        }
        tray.rolls_left -= 1;
        tracing::debug!(%player, rolls_left = tray.rolls_left, "offensive dice rolled");

        let dice = ctx.state.turn.tray.dice().to_vec();
        ctx.emit(DomainEvent::DiceRolled {
            player,
            purpose: RollPurpose::Offensive,
            dice,
        });
        Ok(())
    }
}

impl CommandTransition for ToggleDieLock {
    fn pre_validate(
        &self,
        _player: PlayerId,
        state: &MatchState,
        _env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        require_no_attack(state)?;
        require_phase(state, &[Phase::OffensiveRoll])?;
        let tray = &state.turn.tray;
        if !tray.has_rolled() {
            return Err(CommandError::NotRolled);
        }
        let index = usize::from(self.index);
        if index >= tray.dice.len() {
            return Err(CommandError::DieOutOfRange { index });
        }
        Ok(())
    }

    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        let index = usize::from(self.index);
        let locked = {
            let slot = &mut ctx.state.turn.tray.locked[index];
            *slot = !*slot;
            *slot
        };
        ctx.emit(DomainEvent::DieLockToggled {
            player,
            index: self.index,
            locked,
        });
        Ok(())
    }
}
