//! Definition validation errors.
//!
//! Every variant means hero data and the interpreter disagree, so all of them
//! are fatal. They are raised when definition tables are built, long before a
//! match starts.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{AbilityId, CardId, HeroId, TokenId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("ability '{ability}' declares priority {priority} on more than one variant")]
    DuplicatePriority { ability: AbilityId, priority: i32 },

    #[error("ability '{0}' declares an empty variant list")]
    EmptyVariants(AbilityId),

    #[error("ability '{ability}' requests {dice_count} dice; expected 1..={max}")]
    InvalidDiceCount {
        ability: AbilityId,
        dice_count: u8,
        max: usize,
    },

    #[error("defensive ability '{0}' has no phase trigger sizing its roll")]
    DefensiveWithoutDiceCount(AbilityId),

    #[error("defensive ability '{0}' conditions an effect on attack damage it resolves before")]
    DamageConditionOnDefense(AbilityId),

    #[error("'{owner}' offers a choice without options")]
    EmptyChoice { owner: String },

    #[error("'{owner}' rolls {count} bonus dice; expected 1..={max}")]
    InvalidBonusDice { owner: String, count: u8, max: usize },

    #[error("hero '{hero}' declares {count} die faces; expected 6")]
    InvalidDiceFaces { hero: HeroId, count: usize },

    #[error("hero '{hero}' declares ability '{ability}' twice")]
    DuplicateAbility { hero: HeroId, ability: AbilityId },

    #[error("hero '{hero}' declares card '{card}' twice")]
    DuplicateCard { hero: HeroId, card: CardId },

    #[error("'{owner}' references unknown ability '{ability}'")]
    UnknownAbility { owner: String, ability: AbilityId },

    #[error("'{owner}' references unknown token '{token}'")]
    UnknownToken { owner: String, token: TokenId },

    #[error("'{owner}' uses {action} with token '{token}' of the wrong category")]
    TokenCategoryMismatch {
        owner: String,
        token: TokenId,
        action: &'static str,
    },

    #[error("token '{0}' has a zero stack limit")]
    ZeroStackLimit(TokenId),

    #[error("unique token '{token}' must have stack limit 1, found {limit}")]
    UniqueStackLimit { token: TokenId, limit: u8 },

    #[error("token '{0}' declares an active use without timings")]
    ActiveUseWithoutTiming(TokenId),

    #[error("token '{0}' declares an active use that costs no stacks")]
    ActiveUseWithoutCost(TokenId),

    #[error("token '{0}' declares a passive trigger without actions")]
    PassiveWithoutActions(TokenId),

    #[error("token '{0}' declares a zero damage modifier")]
    ZeroDamageModifier(TokenId),

    #[error("hero '{0}' is defined more than once")]
    DuplicateHero(HeroId),

    #[error("token '{0}' is defined more than once")]
    DuplicateToken(TokenId),
}

impl GameError for DefinitionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use DefinitionError::*;
        match self {
            DuplicatePriority { .. } => "DEFINITION_DUPLICATE_PRIORITY",
            EmptyVariants(_) => "DEFINITION_EMPTY_VARIANTS",
            InvalidDiceCount { .. } => "DEFINITION_INVALID_DICE_COUNT",
            DefensiveWithoutDiceCount(_) => "DEFINITION_DEFENSIVE_WITHOUT_DICE_COUNT",
            DamageConditionOnDefense(_) => "DEFINITION_DAMAGE_CONDITION_ON_DEFENSE",
            EmptyChoice { .. } => "DEFINITION_EMPTY_CHOICE",
            InvalidBonusDice { .. } => "DEFINITION_INVALID_BONUS_DICE",
            InvalidDiceFaces { .. } => "DEFINITION_INVALID_DICE_FACES",
            DuplicateAbility { .. } => "DEFINITION_DUPLICATE_ABILITY",
            DuplicateCard { .. } => "DEFINITION_DUPLICATE_CARD",
            UnknownAbility { .. } => "DEFINITION_UNKNOWN_ABILITY",
            UnknownToken { .. } => "DEFINITION_UNKNOWN_TOKEN",
            TokenCategoryMismatch { .. } => "DEFINITION_TOKEN_CATEGORY_MISMATCH",
            ZeroStackLimit(_) => "DEFINITION_ZERO_STACK_LIMIT",
            UniqueStackLimit { .. } => "DEFINITION_UNIQUE_STACK_LIMIT",
            ActiveUseWithoutTiming(_) => "DEFINITION_ACTIVE_USE_WITHOUT_TIMING",
            ActiveUseWithoutCost(_) => "DEFINITION_ACTIVE_USE_WITHOUT_COST",
            PassiveWithoutActions(_) => "DEFINITION_PASSIVE_WITHOUT_ACTIONS",
            ZeroDamageModifier(_) => "DEFINITION_ZERO_DAMAGE_MODIFIER",
            DuplicateHero(_) => "DEFINITION_DUPLICATE_HERO",
            DuplicateToken(_) => "DEFINITION_DUPLICATE_TOKEN",
        }
    }
}
