use arrayvec::ArrayVec;

use crate::config::RulesConfig;
use crate::dice::Die;

use super::PlayerId;

/// Phases of a single turn, in play order.
///
/// `DefensiveRoll` belongs to the defender and is only entered from inside an
/// attack; [`Phase::next`] never yields it.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Phase {
    Upkeep,
    Income,
    Main1,
    OffensiveRoll,
    DefensiveRoll,
    Main2,
    Discard,
}

impl Phase {
    /// Phase that follows `self` on the active player's track. `None` ends the turn.
    pub const fn next(self) -> Option<Phase> {
        match self {
            Phase::Upkeep => Some(Phase::Income),
            Phase::Income => Some(Phase::Main1),
            Phase::Main1 => Some(Phase::OffensiveRoll),
            Phase::OffensiveRoll | Phase::DefensiveRoll => Some(Phase::Main2),
            Phase::Main2 => Some(Phase::Discard),
            Phase::Discard => None,
        }
    }

    /// Phases the engine walks through without waiting for a command.
    pub const fn is_automatic(self) -> bool {
        matches!(self, Phase::Upkeep | Phase::Income | Phase::Discard)
    }
}

/// Offensive or defensive dice currently on the table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceTray {
    pub owner: PlayerId,
    pub dice: ArrayVec<Die, { RulesConfig::MAX_DICE }>,
    pub locked: [bool; RulesConfig::MAX_DICE],
    pub rolls_left: u8,
}

impl DiceTray {
    pub fn new(owner: PlayerId, rolls: u8) -> Self {
        Self {
            owner,
            dice: ArrayVec::new(),
            locked: [false; RulesConfig::MAX_DICE],
            rolls_left: rolls,
        }
    }

    pub fn has_rolled(&self) -> bool {
        !self.dice.is_empty()
    }

    pub fn is_locked(&self, index: usize) -> bool {
        self.locked.get(index).copied().unwrap_or(false)
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }
}

/// Whose turn it is and where in the turn we are.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    pub active: PlayerId,
    pub phase: Phase,
    pub turn_number: u32,
    pub tray: DiceTray,
    /// Additional offensive roll phases granted by passives this turn.
    pub extra_attacks: u8,
}

impl TurnState {
    pub fn new(active: PlayerId) -> Self {
        Self {
            active,
            phase: Phase::Upkeep,
            turn_number: 1,
            tray: DiceTray::new(active, 0),
            extra_attacks: 0,
        }
    }
}
