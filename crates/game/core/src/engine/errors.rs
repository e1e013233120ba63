//! Error types for the command execution pipeline.

use crate::error::{ErrorContext, ErrorSeverity, GameError};
use crate::event::InteractionKind;
use crate::resolve::ResolveError;
use crate::state::{AbilityId, CardId, Phase, PlayerId, TokenId};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Why a command was refused or failed while being applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("command not allowed during {phase}")]
    WrongPhase { phase: Phase },

    #[error("no rolls left this phase")]
    NoRollsLeft,

    #[error("dice have not been rolled yet")]
    NotRolled,

    #[error("die index {index} is out of range")]
    DieOutOfRange { index: usize },

    #[error("ability '{0}' is not in the player's loadout")]
    AbilityNotOwned(AbilityId),

    #[error("ability '{0}' cannot be used here")]
    WrongAbilityKind(AbilityId),

    #[error("trigger of ability '{0}' is not satisfied")]
    TriggerNotSatisfied(AbilityId),

    #[error("the defender has not picked a defensive ability")]
    DefenseNotChosen,

    #[error("an attack is in progress")]
    AttackInProgress,

    #[error("token '{0}' cannot be used now")]
    TokenNotUsable(TokenId),

    #[error("token '{token}' has {have} stacks, {need} required")]
    InsufficientStacks { token: TokenId, have: u8, need: u8 },

    #[error("token '{0}' cannot be removed by paying")]
    NotRemovable(TokenId),

    #[error("option {option} is out of range")]
    OptionOutOfRange { option: usize },

    #[error("no {expected} interaction is open")]
    WrongInteraction { expected: InteractionKind },

    #[error("choices cannot be skipped")]
    CannotSkipChoice,

    #[error("card '{0}' is not in hand")]
    CardNotInHand(CardId),

    #[error("card '{card}' cannot be played during {phase}")]
    CardNotPlayable { card: CardId, phase: Phase },

    #[error("{need} CP required, {have} available")]
    InsufficientCp { have: u32, need: u32 },

    #[error("invariant violated: {0}")]
    InvariantViolated(&'static str),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl GameError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        use CommandError::*;
        match self {
            WrongPhase { .. } | AttackInProgress => ErrorSeverity::Recoverable,
            NoRollsLeft
            | NotRolled
            | DieOutOfRange { .. }
            | AbilityNotOwned(_)
            | WrongAbilityKind(_)
            | TriggerNotSatisfied(_)
            | DefenseNotChosen
            | TokenNotUsable(_)
            | InsufficientStacks { .. }
            | NotRemovable(_)
            | OptionOutOfRange { .. }
            | WrongInteraction { .. }
            | CannotSkipChoice
            | CardNotInHand(_)
            | CardNotPlayable { .. }
            | InsufficientCp { .. } => ErrorSeverity::Validation,
            InvariantViolated(_) => ErrorSeverity::Internal,
            Resolve(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use CommandError::*;
        match self {
            WrongPhase { .. } => "COMMAND_WRONG_PHASE",
            NoRollsLeft => "COMMAND_NO_ROLLS_LEFT",
            NotRolled => "COMMAND_NOT_ROLLED",
            DieOutOfRange { .. } => "COMMAND_DIE_OUT_OF_RANGE",
            AbilityNotOwned(_) => "COMMAND_ABILITY_NOT_OWNED",
            WrongAbilityKind(_) => "COMMAND_WRONG_ABILITY_KIND",
            TriggerNotSatisfied(_) => "COMMAND_TRIGGER_NOT_SATISFIED",
            DefenseNotChosen => "COMMAND_DEFENSE_NOT_CHOSEN",
            AttackInProgress => "COMMAND_ATTACK_IN_PROGRESS",
            TokenNotUsable(_) => "COMMAND_TOKEN_NOT_USABLE",
            InsufficientStacks { .. } => "COMMAND_INSUFFICIENT_STACKS",
            NotRemovable(_) => "COMMAND_NOT_REMOVABLE",
            OptionOutOfRange { .. } => "COMMAND_OPTION_OUT_OF_RANGE",
            WrongInteraction { .. } => "COMMAND_WRONG_INTERACTION",
            CannotSkipChoice => "COMMAND_CANNOT_SKIP_CHOICE",
            CardNotInHand(_) => "COMMAND_CARD_NOT_IN_HAND",
            CardNotPlayable { .. } => "COMMAND_CARD_NOT_PLAYABLE",
            InsufficientCp { .. } => "COMMAND_INSUFFICIENT_CP",
            InvariantViolated(_) => "COMMAND_INVARIANT_VIOLATED",
            Resolve(error) => error.error_code(),
        }
    }
}

/// Errors surfaced while executing a command through the game engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    #[error("{kind} command failed: {error}")]
    Transition {
        kind: &'static str,
        error: TransitionPhaseError<CommandError>,
        context: ErrorContext,
    },

    #[error("the match is over")]
    MatchOver { context: ErrorContext },

    #[error("not your turn: expected {expected}")]
    NotYourTurn {
        expected: PlayerId,
        context: ErrorContext,
    },

    #[error("{kind} interaction belongs to {owner}")]
    NotInteractionOwner {
        owner: PlayerId,
        kind: InteractionKind,
        context: ErrorContext,
    },

    #[error("{kind} interaction must be resolved first")]
    InteractionPending {
        kind: InteractionKind,
        context: ErrorContext,
    },

    #[error("no interaction is open")]
    NoInteraction { context: ErrorContext },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ExecuteError {
    pub fn match_over(player: PlayerId, nonce: u64) -> Self {
        Self::MatchOver {
            context: ErrorContext::new(nonce).with_player(player),
        }
    }

    pub fn not_your_turn(player: PlayerId, expected: PlayerId, nonce: u64) -> Self {
        Self::NotYourTurn {
            expected,
            context: ErrorContext::new(nonce)
                .with_player(player)
                .with_message("command from a player who is not expected to act"),
        }
    }

    pub fn not_interaction_owner(
        player: PlayerId,
        owner: PlayerId,
        kind: InteractionKind,
        nonce: u64,
    ) -> Self {
        Self::NotInteractionOwner {
            owner,
            kind,
            context: ErrorContext::new(nonce).with_player(player),
        }
    }

    pub fn interaction_pending(player: PlayerId, kind: InteractionKind, nonce: u64) -> Self {
        Self::InteractionPending {
            kind,
            context: ErrorContext::new(nonce).with_player(player),
        }
    }

    pub fn no_interaction(player: PlayerId, nonce: u64) -> Self {
        Self::NoInteraction {
            context: ErrorContext::new(nonce).with_player(player),
        }
    }

    /// The underlying command error, when the failure came from a transition.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            ExecuteError::Transition { error, .. } => Some(&error.error),
            _ => None,
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ExecuteError::Transition { error, .. } => error.error.severity(),
            ExecuteError::MatchOver { .. } | ExecuteError::NoInteraction { .. } => {
                ErrorSeverity::Validation
            }
            ExecuteError::NotYourTurn { .. }
            | ExecuteError::NotInteractionOwner { .. }
            | ExecuteError::InteractionPending { .. } => ErrorSeverity::Recoverable,
            ExecuteError::Resolve(error) => error.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            ExecuteError::Transition { context, .. }
            | ExecuteError::MatchOver { context }
            | ExecuteError::NotYourTurn { context, .. }
            | ExecuteError::NotInteractionOwner { context, .. }
            | ExecuteError::InteractionPending { context, .. }
            | ExecuteError::NoInteraction { context } => Some(context),
            ExecuteError::Resolve(_) => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ExecuteError::Transition { error, .. } => error.error.error_code(),
            ExecuteError::MatchOver { .. } => "EXECUTE_MATCH_OVER",
            ExecuteError::NotYourTurn { .. } => "EXECUTE_NOT_YOUR_TURN",
            ExecuteError::NotInteractionOwner { .. } => "EXECUTE_NOT_INTERACTION_OWNER",
            ExecuteError::InteractionPending { .. } => "EXECUTE_INTERACTION_PENDING",
            ExecuteError::NoInteraction { .. } => "EXECUTE_NO_INTERACTION",
            ExecuteError::Resolve(error) => error.error_code(),
        }
    }
}
