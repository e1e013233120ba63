//! Effect resolution pipeline.
//!
//! Runs effect lists against the match state through a [`ResolveCtx`], which
//! bundles the state being mutated with the definition oracles, the random
//! source and the event sink. Attack resolution is a resumable state machine
//! (see [`crate::state::AttackStage`]); a `Choice` or bonus re-roll suspends it
//! by opening an interaction, and [`drive`] picks it up again once the
//! interaction closes.
mod actions;
mod attack;
mod error;
mod passive;

pub use actions::{deal_direct, eval_amount, eval_condition, run_actions, run_custom};
pub use attack::{begin_defense, drive, roll_defense, start_attack};
pub use error::ResolveError;
pub use passive::{PassiveOutcome, fire_passives};

pub(crate) use actions::{apply_roll_outcomes, change_cp, defer, draw_cards, grant_token};

use crate::ability::{AbilityDefinition, AbilityEffect, HeroDefinition, Target, VariantRef};
use crate::combat::PendingDamage;
use crate::config::RulesConfig;
use crate::dice::Die;
use crate::env::{GameEnv, HeroOracle, OracleError, RandomFn};
use crate::event::{DomainEvent, EventSink};
use crate::state::{AbilityId, MatchState, PlayerId, TokenId};
use crate::token::TokenDefinition;

/// How `Damage` actions behave in the current scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageMode {
    /// Adds to the attack's pending damage.
    Contribute,
    /// Deals damage straight to the opponent.
    Direct,
}

/// Who is acting and what dice the surrounding ability was triggered by.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionScope {
    pub actor: PlayerId,
    pub mode: DamageMode,
    pub dice: Vec<Die>,
}

impl ActionScope {
    pub fn direct(actor: PlayerId) -> Self {
        Self {
            actor,
            mode: DamageMode::Direct,
            dice: Vec::new(),
        }
    }

    pub fn contributing(actor: PlayerId, dice: Vec<Die>) -> Self {
        Self {
            actor,
            mode: DamageMode::Contribute,
            dice,
        }
    }

    pub fn with_dice(mut self, dice: Vec<Die>) -> Self {
        self.dice = dice;
        self
    }

    /// Player an effect targeting `target` lands on.
    pub fn target(&self, target: Target) -> PlayerId {
        match target {
            Target::SelfPlayer => self.actor,
            Target::Opponent => self.actor.opponent(),
        }
    }
}

/// Whether a run of actions finished or is waiting on an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Suspended,
}

impl Flow {
    pub fn is_suspended(self) -> bool {
        self == Flow::Suspended
    }
}

/// Mutable resolution context for one command.
pub struct ResolveCtx<'s, 'e> {
    pub state: &'s mut MatchState,
    pub env: GameEnv<'e>,
    pub rng: &'s mut dyn RandomFn,
    pub events: &'s mut dyn EventSink,
    /// Current nesting of passive triggers.
    depth: u8,
    /// Damage being landed outside the attack pipeline, innermost last.
    in_flight: Vec<(PlayerId, PendingDamage)>,
}

impl<'s, 'e> ResolveCtx<'s, 'e> {
    pub fn new(
        state: &'s mut MatchState,
        env: GameEnv<'e>,
        rng: &'s mut dyn RandomFn,
        events: &'s mut dyn EventSink,
    ) -> Self {
        Self {
            state,
            env,
            rng,
            events,
            depth: 0,
            in_flight: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: DomainEvent) {
        self.events.emit(event);
    }

    // ===== definition lookups =====

    pub fn heroes(&self) -> Result<&'e dyn HeroOracle, ResolveError> {
        Ok(self.env.heroes()?)
    }

    pub fn rules(&self) -> Result<&'e RulesConfig, ResolveError> {
        Ok(self.env.config()?.rules())
    }

    pub fn token(&self, id: &TokenId) -> Result<&'e TokenDefinition, ResolveError> {
        self.heroes()?
            .token(id)
            .ok_or_else(|| OracleError::TokenNotFound(id.clone()).into())
    }

    pub fn hero(&self, player: PlayerId) -> Result<&'e HeroDefinition, ResolveError> {
        let id = &self.state.player(player).hero;
        self.heroes()?
            .hero(id)
            .ok_or_else(|| OracleError::HeroNotFound(id.clone()).into())
    }

    pub fn ability(
        &self,
        player: PlayerId,
        ability: &AbilityId,
    ) -> Result<&'e AbilityDefinition, ResolveError> {
        let hero = self.hero(player)?;
        hero.ability(ability).ok_or_else(|| {
            OracleError::AbilityNotFound {
                hero: hero.id.clone(),
                ability: ability.clone(),
            }
            .into()
        })
    }

    pub fn variant_effects(
        &self,
        player: PlayerId,
        variant: &VariantRef,
    ) -> Result<&'e [AbilityEffect], ResolveError> {
        let ability = self.ability(player, &variant.ability)?;
        ability
            .effects(variant.variant)
            .ok_or_else(|| ResolveError::MissingAbility {
                hero: self.state.player(player).hero.clone(),
                ability: variant.ability.clone(),
                variant: variant.variant,
            })
    }

    /// Rolls `count` dice on `player`'s hero faces.
    pub fn roll_dice(&mut self, player: PlayerId, count: usize) -> Result<Vec<Die>, ResolveError> {
        let hero = self.hero(player)?;
        (0..count)
            .map(|_| {
                let value = self.rng.d(RulesConfig::DIE_SIDES) as u8;
                hero.face(value)
                    .map(|symbol| Die::new(value, symbol.clone()))
                    .ok_or_else(|| ResolveError::MissingFace {
                        hero: hero.id.clone(),
                        value,
                    })
            })
            .collect()
    }

    // ===== damage bookkeeping =====

    /// Damage currently in flight: the innermost direct damage being landed,
    /// otherwise the attack's pending damage.
    pub fn pending(&self) -> Option<&PendingDamage> {
        self.in_flight
            .last()
            .map(|(_, pending)| pending)
            .or_else(|| self.state.attack.as_ref().map(|attack| &attack.pending))
    }

    pub fn pending_mut(&mut self) -> Option<&mut PendingDamage> {
        match self.in_flight.last_mut() {
            Some((_, pending)) => Some(pending),
            None => self.state.attack.as_mut().map(|attack| &mut attack.pending),
        }
    }

    pub(crate) fn push_in_flight(&mut self, target: PlayerId, pending: PendingDamage) {
        self.in_flight.push((target, pending));
    }

    pub(crate) fn pop_in_flight(&mut self) -> Option<PendingDamage> {
        self.in_flight.pop().map(|(_, pending)| pending)
    }

    pub(crate) fn depth(&self) -> u8 {
        self.depth
    }

    pub(crate) fn enter_trigger(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn leave_trigger(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
