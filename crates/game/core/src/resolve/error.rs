//! Errors raised while resolving effects.

use crate::dice::MatchError;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::registry::HandlerError;
use crate::state::{AbilityId, CustomActionId, HeroId, PlayerId};
use crate::token::LedgerError;

/// Resolution failures. Apart from `Ledger` rejections they all indicate
/// that hero data and interpreter are out of sync, or an engine bug.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("custom action '{0}' is not registered")]
    UnknownCustomAction(CustomActionId),

    #[error("custom action '{action}' failed: {source}")]
    Handler {
        action: CustomActionId,
        source: HandlerError,
    },

    #[error("ability '{ability}' (variant {variant:?}) not found for hero '{hero}'")]
    MissingAbility {
        hero: HeroId,
        ability: AbilityId,
        variant: Option<usize>,
    },

    #[error("hero '{hero}' has no face for die value {value}")]
    MissingFace { hero: HeroId, value: u8 },

    #[error("passive triggers nested deeper than {depth}")]
    TriggerChainTooDeep { depth: u8 },

    #[error("phase flow did not settle after {steps} steps")]
    PhaseLoop { steps: usize },

    #[error("custom action '{action}' changed pending damage outside a damage flow")]
    PendingDamageUnavailable { action: CustomActionId },

    #[error("no attack in progress for {player}")]
    AttackMissing { player: PlayerId },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

impl GameError for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        use ResolveError::*;
        match self {
            Ledger(error) => error.severity(),
            AttackMissing { .. } | PhaseLoop { .. } => ErrorSeverity::Internal,
            UnknownCustomAction(_)
            | Handler { .. }
            | MissingAbility { .. }
            | MissingFace { .. }
            | TriggerChainTooDeep { .. }
            | PendingDamageUnavailable { .. }
            | Oracle(_)
            | Match(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        use ResolveError::*;
        match self {
            UnknownCustomAction(_) => "RESOLVE_UNKNOWN_CUSTOM_ACTION",
            Handler { .. } => "RESOLVE_HANDLER_FAILED",
            MissingAbility { .. } => "RESOLVE_MISSING_ABILITY",
            MissingFace { .. } => "RESOLVE_MISSING_FACE",
            TriggerChainTooDeep { .. } => "RESOLVE_TRIGGER_CHAIN_TOO_DEEP",
            PhaseLoop { .. } => "RESOLVE_PHASE_LOOP",
            PendingDamageUnavailable { .. } => "RESOLVE_PENDING_DAMAGE_UNAVAILABLE",
            AttackMissing { .. } => "RESOLVE_ATTACK_MISSING",
            Ledger(error) => error.error_code(),
            Oracle(error) => error.error_code(),
            Match(error) => error.error_code(),
        }
    }
}
