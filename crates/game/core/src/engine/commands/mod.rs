//! Transitions for each command kind.
mod ability;
mod card;
mod dice;
mod response;
mod turn;

use crate::event::InteractionKind;
use crate::interaction::Interaction;
use crate::state::{AttackStage, MatchState, Phase, PlayerId};

use super::errors::CommandError;

/// Whether `player` is the defender the current attack is waiting on.
fn awaiting_defense(state: &MatchState, player: PlayerId) -> bool {
    state
        .attack
        .as_ref()
        .is_some_and(|attack| {
            attack.stage == AttackStage::AwaitDefense && attack.defender == player
        })
}

fn require_phase(state: &MatchState, allowed: &[Phase]) -> Result<(), CommandError> {
    if allowed.contains(&state.turn.phase) {
        Ok(())
    } else {
        Err(CommandError::WrongPhase {
            phase: state.turn.phase,
        })
    }
}

fn require_no_attack(state: &MatchState) -> Result<(), CommandError> {
    if state.attack.is_some() {
        return Err(CommandError::AttackInProgress);
    }
    Ok(())
}

/// The open interaction, if it is of the `expected` kind.
fn open_interaction(
    state: &MatchState,
    expected: InteractionKind,
) -> Result<&Interaction, CommandError> {
    state
        .interaction
        .current
        .as_ref()
        .filter(|interaction| interaction.kind() == expected)
        .ok_or(CommandError::WrongInteraction { expected })
}
