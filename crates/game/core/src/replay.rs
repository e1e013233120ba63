//! Deterministic re-execution of recorded matches.
//!
//! A match is fully described by its seed, the two heroes and the ordered
//! command log. Every command draws from its own random stream derived from
//! the match seed and the nonce it executes at, so a host that used
//! [`command_rng`] live reproduces the same state here.

use crate::engine::{Command, ExecuteError, GameEngine, setup_match};
use crate::env::{GameEnv, PcgRandom};
use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::event::DomainEvent;
use crate::resolve::ResolveError;
use crate::state::{HeroId, MatchState};

/// Seed, heroes and commands of one match.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayLog {
    pub seed: u64,
    pub heroes: [HeroId; 2],
    pub commands: Vec<Command>,
}

impl ReplayLog {
    pub fn new(seed: u64, heroes: [HeroId; 2]) -> Self {
        Self {
            seed,
            heroes,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("match setup failed: {0}")]
    Setup(#[from] ResolveError),

    #[error("command #{index} failed: {source}")]
    Command { index: usize, source: ExecuteError },
}

impl GameError for ReplayError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ReplayError::Setup(error) => error.severity(),
            ReplayError::Command { source, .. } => source.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            ReplayError::Setup(_) => None,
            ReplayError::Command { source, .. } => source.context(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ReplayError::Setup(_) => "REPLAY_SETUP",
            ReplayError::Command { .. } => "REPLAY_COMMAND",
        }
    }
}

/// Final state of a replayed match plus every event it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub state: MatchState,
    pub events: Vec<DomainEvent>,
}

/// Random stream for the next command executed against `state`.
pub fn command_rng(state: &MatchState) -> PcgRandom {
    PcgRandom::for_command(state.seed, state.nonce)
}

/// Sets the match up from `log` and re-executes every command in order.
pub fn replay(env: GameEnv<'_>, log: &ReplayLog) -> Result<ReplayOutcome, ReplayError> {
    let (mut state, mut events) = setup_match(env, log.heroes.clone(), log.seed)?;

    for (index, command) in log.commands.iter().enumerate() {
        let mut rng = command_rng(&state);
        let outcome = GameEngine::new(&mut state)
            .execute(env, &mut rng, command)
            .map_err(|source| ReplayError::Command { index, source })?;
        events.extend(outcome.events);
    }

    tracing::info!(
        seed = log.seed,
        commands = log.commands.len(),
        nonce = state.nonce,
        winner = ?state.winner,
        "replay finished"
    );
    Ok(ReplayOutcome { state, events })
}

/// SHA-256 commitment to a command sequence. Order matters.
#[cfg(feature = "serde")]
pub fn compute_commands_root(commands: &[Command]) -> Result<[u8; 32], bincode::Error> {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for command in commands {
        hasher.update(bincode::serialize(command)?);
    }
    Ok(hasher.finalize().into())
}

/// SHA-256 commitment to a match state.
#[cfg(feature = "serde")]
pub fn state_root(state: &MatchState) -> Result<[u8; 32], bincode::Error> {
    use sha2::{Digest, Sha256};

    let bytes = bincode::serialize(state)?;
    Ok(Sha256::digest(&bytes).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AdvancePhase, RollDice, ToggleDieLock};
    use crate::state::{Phase, PlayerId};
    use crate::testing::fixtures;

    fn opening() -> Vec<Command> {
        let first = PlayerId::FIRST;
        vec![
            Command::new(first, AdvancePhase),
            Command::new(first, RollDice),
            Command::new(first, ToggleDieLock { index: 0 }),
            Command::new(first, RollDice),
        ]
    }

    fn heroes() -> [HeroId; 2] {
        [HeroId::from(fixtures::KNIGHT), HeroId::from(fixtures::KNIGHT)]
    }

    #[test]
    fn replay_matches_a_live_session() {
        let tables = fixtures::tables();
        let rules = fixtures::rules();
        let registry = fixtures::registry();
        let env = fixtures::env(&tables, &rules, &registry);

        let (mut live, _) = setup_match(env, heroes(), 11).unwrap();
        let mut log = ReplayLog::new(11, heroes());
        for command in opening() {
            let mut rng = command_rng(&live);
            GameEngine::new(&mut live)
                .execute(env, &mut rng, &command)
                .unwrap();
            log.push(command);
        }

        let replayed = replay(env, &log).unwrap();
        assert_eq!(replayed.state, live);
        assert_eq!(replayed.state.turn.phase, Phase::OffensiveRoll);
        assert_eq!(replay(env, &log).unwrap(), replayed);
    }

    #[test]
    fn failing_command_reports_its_index() {
        let tables = fixtures::tables();
        let rules = fixtures::rules();
        let registry = fixtures::registry();
        let env = fixtures::env(&tables, &rules, &registry);

        let mut log = ReplayLog::new(3, heroes());
        log.push(Command::new(PlayerId::FIRST, AdvancePhase));
        log.push(Command::new(PlayerId::SECOND, RollDice));

        let err = replay(env, &log).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Command {
                index: 1,
                source: ExecuteError::NotYourTurn { .. }
            }
        ));
        assert_eq!(err.error_code(), "REPLAY_COMMAND");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn commands_root_depends_on_order() {
        let commands = opening();
        let mut swapped = commands.clone();
        swapped.swap(0, 1);

        let root = compute_commands_root(&commands).unwrap();
        assert_eq!(root, compute_commands_root(&commands).unwrap());
        assert_ne!(root, compute_commands_root(&swapped).unwrap());
        assert_eq!(hex::encode(root).len(), 64);
        assert!(matches!(
            commands[0].kind,
            crate::engine::CommandKind::AdvancePhase(_)
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn commands_root_covers_every_command() {
        use sha2::{Digest, Sha256};

        let commands = opening();
        let mut hasher = Sha256::new();
        for command in &commands {
            hasher.update(bincode::serialize(command).unwrap());
        }
        let expected: [u8; 32] = hasher.finalize().into();
        assert_eq!(compute_commands_root(&commands).unwrap(), expected);

        let shorter = compute_commands_root(&commands[..commands.len() - 1]).unwrap();
        assert_ne!(shorter, expected);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn state_root_tracks_state() {
        let state = fixtures::match_state();
        let mut changed = state.clone();
        changed.player_mut(PlayerId::SECOND).hp -= 1;
        let root = state_root(&state).unwrap();
        assert_eq!(root, state_root(&state.clone()).unwrap());
        assert_ne!(root, state_root(&changed).unwrap());
    }
}
