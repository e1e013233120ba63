//! Deterministic rules interpreter for two-player dice and card duels.
//!
//! `duel-core` holds the canonical rules: hero, ability, token and card
//! definitions, the trigger matcher, the attack resolution pipeline and the
//! response windows that suspend it. It performs no I/O. Hosts feed commands
//! and a random source through [`engine::GameEngine`] and receive the next
//! [`state::MatchState`] plus the [`event::DomainEvent`]s it produced.
pub mod ability;
pub mod combat;
pub mod config;
pub mod dice;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod interaction;
pub mod registry;
pub mod replay;
pub mod resolve;
pub mod state;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use ability::{
    AbilityDefinition, AbilityEffect, AbilityKind, AbilityTags, Amount, CardDefinition,
    DefinitionError, EffectAction, EffectCondition, EffectTiming, HeroDefinition, Target,
    VariantRef,
};
pub use config::RulesConfig;
pub use dice::{AbilityMatch, Die, TriggerCondition, legal_abilities, select_variant};
pub use engine::{
    Command, CommandError, CommandKind, ExecuteError, ExecutionOutcome, GameEngine,
    TransitionPhase, TransitionPhaseError, reduce, setup_match,
};
pub use env::{
    ConfigOracle, Env, GameEnv, HeroOracle, HeroTables, OracleError, PcgRandom, QueuedRandom,
    RandomFn,
};
pub use error::{ErrorContext, ErrorSeverity, GameError};
pub use event::{DomainEvent, EventSink, InteractionKind, RollPurpose};
pub use interaction::{Interaction, WindowKind};
pub use registry::{
    ActionCategories, ActionMetadata, CustomActionContext, CustomActionHandler,
    CustomActionRegistry, CustomDelta, HandlerError,
};
pub use replay::{ReplayError, ReplayLog, ReplayOutcome, command_rng, replay};
#[cfg(feature = "serde")]
pub use replay::{compute_commands_root, state_root};
pub use resolve::ResolveError;
pub use state::{
    AbilityId, AttackState, CardId, CustomActionId, HeroId, MatchState, Phase, PlayerId,
    PlayerState, Symbol, TokenId,
};
pub use token::{TokenCategory, TokenDefinition, TokenLedger};
