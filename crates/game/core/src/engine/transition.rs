//! Command transition trait and dispatch.

use crate::ability::HeroDefinition;
use crate::env::{GameEnv, OracleError, RandomFn};
use crate::event::EventSink;
use crate::resolve::{ResolveCtx, ResolveError};
use crate::state::{MatchState, PlayerId};

use super::command::{Command, CommandKind};
use super::errors::{CommandError, ExecuteError, TransitionPhase, TransitionPhaseError};
use crate::error::ErrorContext;

/// Defines how one command kind checks and mutates the match.
///
/// `pre_validate` and `post_validate` only read state; a rejection in either
/// leaves the committed state untouched because the engine works on a clone.
pub trait CommandTransition {
    /// Validates pre-conditions using the state **before** mutation.
    fn pre_validate(
        &self,
        _player: PlayerId,
        _state: &MatchState,
        _env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        Ok(())
    }

    /// Applies the command. Implementations may assume `pre_validate` passed.
    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(
        &self,
        _player: PlayerId,
        state: &MatchState,
        env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        check_invariants(state, env)
    }
}

/// Resource bounds every committed state satisfies.
pub fn check_invariants(state: &MatchState, env: &GameEnv<'_>) -> Result<(), CommandError> {
    let heroes = env.heroes().map_err(ResolveError::from)?;
    let max_cp = env.config().map_err(ResolveError::from)?.rules().max_cp;

    for seat in &state.players {
        if seat.hp > seat.max_hp {
            return Err(CommandError::InvariantViolated("hp above maximum"));
        }
        if seat.cp > max_cp {
            return Err(CommandError::InvariantViolated("cp above maximum"));
        }
        for (token, stacks) in seat.tokens.iter() {
            let definition = heroes
                .token(token)
                .ok_or_else(|| ResolveError::from(OracleError::TokenNotFound(token.clone())))?;
            if stacks == 0 || stacks > definition.stack_limit {
                return Err(CommandError::InvariantViolated("token stacks out of bounds"));
            }
        }
    }
    if state.winner.is_some() && state.interaction.is_open() {
        return Err(CommandError::InvariantViolated("interaction open after the match ended"));
    }
    Ok(())
}

/// Hero definition for `player`'s seat.
pub(crate) fn hero_of<'e>(
    state: &MatchState,
    env: &GameEnv<'e>,
    player: PlayerId,
) -> Result<&'e HeroDefinition, CommandError> {
    let id = &state.player(player).hero;
    let heroes = env.heroes().map_err(ResolveError::from)?;
    heroes
        .hero(id)
        .ok_or_else(|| ResolveError::from(OracleError::HeroNotFound(id.clone())).into())
}

/// Runs one transition through the three-phase pipeline:
///
/// 1. `pre_validate` - Check preconditions before mutation
/// 2. `apply` - Mutate the match state
/// 3. `post_validate` - Verify postconditions after mutation
#[inline]
fn drive_transition<T>(
    transition: &T,
    player: PlayerId,
    state: &mut MatchState,
    env: GameEnv<'_>,
    rng: &mut dyn RandomFn,
    events: &mut dyn EventSink,
) -> Result<(), TransitionPhaseError<CommandError>>
where
    T: CommandTransition,
{
    transition
        .pre_validate(player, state, &env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    {
        let mut ctx = ResolveCtx::new(state, env, rng, events);
        transition
            .apply(player, &mut ctx)
            .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;
    }

    transition
        .post_validate(player, state, &env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))
}

/// Routes a command to its transition.
pub(super) fn dispatch(
    command: &Command,
    state: &mut MatchState,
    env: GameEnv<'_>,
    rng: &mut dyn RandomFn,
    events: &mut dyn EventSink,
) -> Result<(), ExecuteError> {
    let player = command.player;
    let nonce = state.nonce;
    let result = match &command.kind {
        CommandKind::RollDice(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::ToggleDieLock(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::SelectAbility(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::UseToken(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::RerollBonusDie(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::ResolveChoice(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::SkipWindow(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::AdvancePhase(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::PlayCard(t) => drive_transition(t, player, state, env, rng, events),
        CommandKind::PayRemovalCost(t) => drive_transition(t, player, state, env, rng, events),
    };
    result.map_err(|error| ExecuteError::Transition {
        kind: command.kind.name(),
        error,
        context: ErrorContext::new(nonce).with_player(player),
    })
}
