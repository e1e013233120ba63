//! Oracle access errors.
//!
//! Errors related to oracle availability and definition lookups.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{AbilityId, CardId, HeroId, TokenId};

/// Errors that occur when accessing oracle data.
///
/// A missing oracle or definition means the host wired the engine with data
/// that does not match the match state, so every variant is fatal.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// HeroOracle is not available in the environment.
    #[error("HeroOracle not available")]
    HeroesNotAvailable,

    /// ConfigOracle is not available in the environment.
    #[error("ConfigOracle not available")]
    ConfigNotAvailable,

    /// Custom action registry is not available in the environment.
    #[error("custom action registry not available")]
    RegistryNotAvailable,

    #[error("hero '{0}' not found")]
    HeroNotFound(HeroId),

    #[error("ability '{ability}' not found for hero '{hero}'")]
    AbilityNotFound { hero: HeroId, ability: AbilityId },

    #[error("card '{card}' not found for hero '{hero}'")]
    CardNotFound { hero: HeroId, card: CardId },

    #[error("token '{0}' not found")]
    TokenNotFound(TokenId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            HeroesNotAvailable => "ORACLE_HEROES_NOT_AVAILABLE",
            ConfigNotAvailable => "ORACLE_CONFIG_NOT_AVAILABLE",
            RegistryNotAvailable => "ORACLE_REGISTRY_NOT_AVAILABLE",
            HeroNotFound(_) => "ORACLE_HERO_NOT_FOUND",
            AbilityNotFound { .. } => "ORACLE_ABILITY_NOT_FOUND",
            CardNotFound { .. } => "ORACLE_CARD_NOT_FOUND",
            TokenNotFound(_) => "ORACLE_TOKEN_NOT_FOUND",
        }
    }
}
