//! Command execution pipeline and turn flow.
//!
//! The [`GameEngine`] is the authoritative reducer for [`MatchState`]. Every
//! command runs through `pre_validate → apply → post_validate` on a clone of
//! the state; the clone is committed only when all three pass, so a rejected
//! command never leaves a partial mutation behind.

mod command;
mod commands;
mod errors;
mod setup;
mod transition;
mod turns;

pub use command::{
    AdvancePhase, Command, CommandKind, PayRemovalCost, PlayCard, RerollBonusDie, ResolveChoice,
    RollDice, SelectAbility, SkipWindow, ToggleDieLock, UseToken,
};
pub use errors::{CommandError, ExecuteError, TransitionPhase, TransitionPhaseError};
pub use setup::setup_match;
pub use transition::{CommandTransition, check_invariants};

pub(crate) use turns::enter_phase;

use crate::env::{GameEnv, RandomFn};
use crate::error::GameError;
use crate::event::{DomainEvent, InteractionKind};
use crate::state::{MatchState, PlayerId};

/// Everything a host needs after a successful command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionOutcome {
    /// Events in emission order.
    pub events: Vec<DomainEvent>,
    /// Interaction now waiting for input, if any.
    pub interaction: Option<InteractionKind>,
    /// Player whose command the engine admits next.
    pub next_actor: PlayerId,
    pub winner: Option<PlayerId>,
}

/// Game engine that validates and executes commands against a match.
pub struct GameEngine<'a> {
    state: &'a mut MatchState,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut MatchState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &MatchState {
        self.state
    }

    /// Executes `command`, drawing all randomness from `rng`.
    ///
    /// On error the state is exactly as it was before the call.
    pub fn execute(
        &mut self,
        env: GameEnv<'_>,
        rng: &mut dyn RandomFn,
        command: &Command,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        if let Err(error) = self.validate_actor(command) {
            tracing::warn!(
                player = %command.player,
                kind = command.kind.name(),
                code = error.error_code(),
                %error,
                "command rejected"
            );
            return Err(error);
        }

        let mut next = self.state.clone();
        let mut events = Vec::new();
        if let Err(error) = transition::dispatch(command, &mut next, env, rng, &mut events) {
            if error.severity().is_internal() {
                tracing::error!(
                    player = %command.player,
                    kind = command.kind.name(),
                    code = error.error_code(),
                    %error,
                    "command failed"
                );
            } else {
                tracing::warn!(
                    player = %command.player,
                    kind = command.kind.name(),
                    code = error.error_code(),
                    %error,
                    "command rejected"
                );
            }
            return Err(error);
        }

        next.nonce += 1;
        *self.state = next;
        tracing::debug!(
            player = %command.player,
            kind = command.kind.name(),
            nonce = self.state.nonce,
            events = events.len(),
            "command executed"
        );

        Ok(ExecutionOutcome {
            events,
            interaction: self.state.interaction.kind(),
            next_actor: self.next_actor(),
            winner: self.state.winner,
        })
    }

    /// Player whose command is admitted next: the interaction owner when one
    /// is open, otherwise the turn's expected actor.
    pub fn next_actor(&self) -> PlayerId {
        self.state
            .interaction
            .owner()
            .unwrap_or_else(|| self.state.expected_actor())
    }

    fn validate_actor(&self, command: &Command) -> Result<(), ExecuteError> {
        let nonce = self.state.nonce;
        let player = command.player;

        if self.state.is_over() {
            return Err(ExecuteError::match_over(player, nonce));
        }

        match self.state.interaction.current.as_ref() {
            Some(interaction) => {
                let owner = interaction.owner();
                if player != owner {
                    return Err(ExecuteError::not_interaction_owner(
                        player,
                        owner,
                        interaction.kind(),
                        nonce,
                    ));
                }
                if !command.kind.is_interaction_response() {
                    return Err(ExecuteError::interaction_pending(
                        player,
                        interaction.kind(),
                        nonce,
                    ));
                }
            }
            None => {
                if command.kind.is_interaction_response() {
                    return Err(ExecuteError::no_interaction(player, nonce));
                }
                let expected = self.state.expected_actor();
                if player != expected {
                    return Err(ExecuteError::not_your_turn(player, expected, nonce));
                }
            }
        }
        Ok(())
    }
}

/// Pure form of [`GameEngine::execute`]: returns the next state and its
/// events without touching `state`.
pub fn reduce(
    state: &MatchState,
    env: GameEnv<'_>,
    rng: &mut dyn RandomFn,
    command: &Command,
) -> Result<(MatchState, Vec<DomainEvent>), ExecuteError> {
    let mut next = state.clone();
    let outcome = GameEngine::new(&mut next).execute(env, rng, command)?;
    Ok((next, outcome.events))
}

#[cfg(test)]
mod tests;
