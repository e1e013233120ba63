//! Domain events emitted by the engine.
//!
//! Events describe what happened in order; downstream systems (animation,
//! tutorials, logging) subscribe to them but can never mutate match state.

use crate::dice::Die;
use crate::state::{AbilityId, CardId, PlayerId, Phase, TokenId};
use crate::token::PassiveTiming;

/// Why dice were rolled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RollPurpose {
    Offensive,
    Defensive,
    Bonus,
    BonusReroll,
    Negate,
}

/// Kind of sub-protocol that suspended normal command processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum InteractionKind {
    AttackerBoost,
    DefenderMitigation,
    Choice,
    BonusDiceReroll,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DomainEvent {
    PhaseEntered {
        player: PlayerId,
        phase: Phase,
    },
    PhaseSkipped {
        player: PlayerId,
        phase: Phase,
    },
    DiceRolled {
        player: PlayerId,
        purpose: RollPurpose,
        dice: Vec<Die>,
    },
    DieLockToggled {
        player: PlayerId,
        index: u8,
        locked: bool,
    },
    AbilityActivated {
        player: PlayerId,
        ability: AbilityId,
        variant: Option<usize>,
    },
    DamageDealt {
        target: PlayerId,
        original: u32,
        final_amount: u32,
        /// Dealt outside an attack's damage pipeline.
        direct: bool,
    },
    DamagePrevented {
        target: PlayerId,
        amount: u32,
    },
    AttackEvaded {
        defender: PlayerId,
        token: TokenId,
    },
    Healed {
        player: PlayerId,
        amount: u32,
    },
    /// HP lost outside of damage (passive stat changes).
    HpLost {
        player: PlayerId,
        amount: u32,
    },
    CpChanged {
        player: PlayerId,
        before: u32,
        after: u32,
    },
    ShieldGranted {
        player: PlayerId,
        amount: u32,
        total: u32,
    },
    TokenGranted {
        player: PlayerId,
        token: TokenId,
        before: u8,
        after: u8,
    },
    TokenConsumed {
        player: PlayerId,
        token: TokenId,
        before: u8,
        after: u8,
    },
    TokenUsed {
        player: PlayerId,
        token: TokenId,
        cost: u8,
    },
    TokenRemoved {
        player: PlayerId,
        token: TokenId,
        stacks: u8,
    },
    PassiveTriggered {
        player: PlayerId,
        token: TokenId,
        timing: PassiveTiming,
    },
    InteractionRequested {
        owner: PlayerId,
        kind: InteractionKind,
    },
    InteractionClosed {
        owner: PlayerId,
        kind: InteractionKind,
    },
    ChoiceResolved {
        player: PlayerId,
        option: usize,
    },
    CardDrawn {
        player: PlayerId,
        card: CardId,
    },
    CardPlayed {
        player: PlayerId,
        card: CardId,
    },
    DeckReshuffled {
        player: PlayerId,
        cards: usize,
    },
    AbilityReplaced {
        player: PlayerId,
        from: AbilityId,
        to: AbilityId,
        level: u8,
    },
    AttackResolved {
        attacker: PlayerId,
        defender: PlayerId,
        ability: AbilityId,
        damage: u32,
        evaded: bool,
    },
    PlayerDefeated {
        player: PlayerId,
    },
}

/// Receives events in emission order.
pub trait EventSink {
    fn emit(&mut self, event: DomainEvent);
}

impl EventSink for Vec<DomainEvent> {
    fn emit(&mut self, event: DomainEvent) {
        tracing::trace!(?event, "event");
        self.push(event);
    }
}
