//! Authoritative match state.
//!
//! [`MatchState`] is the single owned resource of a match. Every mutation goes
//! through [`crate::engine::GameEngine`], which works on a clone and commits
//! only when a command succeeds.
mod attack;
mod ids;
mod player;
mod turn;

pub use attack::{AttackStage, AttackState, EffectCursor, WindowPhase};
pub use ids::{AbilityId, CardId, CustomActionId, HeroId, PlayerId, Symbol, TokenId};
pub use player::PlayerState;
pub use turn::{DiceTray, Phase, TurnState};

use crate::interaction::InteractionState;

/// Complete state of a two-player match.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchState {
    /// Seed every per-command random stream is derived from.
    pub seed: u64,
    /// Count of successfully executed commands.
    pub nonce: u64,
    pub players: [PlayerState; 2],
    pub turn: TurnState,
    pub attack: Option<AttackState>,
    pub interaction: InteractionState,
    pub winner: Option<PlayerId>,
}

impl MatchState {
    pub fn new(seed: u64, players: [PlayerState; 2]) -> Self {
        Self {
            seed,
            nonce: 0,
            players,
            turn: TurnState::new(PlayerId::FIRST),
            attack: None,
            interaction: InteractionState::default(),
            winner: None,
        }
    }

    #[inline]
    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.index()]
    }

    #[inline]
    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        &mut self.players[id.index()]
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Player whose command the engine admits next, ignoring open interactions.
    pub fn expected_actor(&self) -> PlayerId {
        match &self.attack {
            Some(attack) if attack.stage == AttackStage::AwaitDefense => attack.defender,
            _ => self.turn.active,
        }
    }
}
