//! Player commands accepted by the engine.

use crate::state::{AbilityId, CardId, PlayerId, TokenId};

/// Rolls the offensive tray, or the defender's chosen defensive ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollDice;

/// Locks or unlocks one die of the offensive tray between rolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToggleDieLock {
    pub index: u8,
}

/// Commits to an offensive ability, or picks the defensive ability to roll.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectAbility {
    pub ability: AbilityId,
}

/// Spends a token inside the open response window.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UseToken {
    pub token: TokenId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RerollBonusDie {
    pub index: u8,
    pub token: TokenId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolveChoice {
    pub option: usize,
}

/// Passes on the open response window or bonus re-roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkipWindow;

/// Ends the current main or roll phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdvancePhase;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayCard {
    pub card: CardId,
}

/// Pays a token's removal cost in CP to get rid of it early.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayRemovalCost {
    pub token: TokenId,
}

#[derive(Clone, Debug, PartialEq, Eq, strum::AsRefStr, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    RollDice(RollDice),
    ToggleDieLock(ToggleDieLock),
    SelectAbility(SelectAbility),
    UseToken(UseToken),
    RerollBonusDie(RerollBonusDie),
    ResolveChoice(ResolveChoice),
    SkipWindow(SkipWindow),
    AdvancePhase(AdvancePhase),
    PlayCard(PlayCard),
    PayRemovalCost(PayRemovalCost),
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Commands that answer an open interaction rather than drive the turn.
    pub fn is_interaction_response(&self) -> bool {
        matches!(
            self,
            CommandKind::UseToken(_)
                | CommandKind::RerollBonusDie(_)
                | CommandKind::ResolveChoice(_)
                | CommandKind::SkipWindow(_)
        )
    }
}

macro_rules! command_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for CommandKind {
                fn from(command: $variant) -> Self {
                    CommandKind::$variant(command)
                }
            }
        )*
    };
}

command_from!(
    RollDice,
    ToggleDieLock,
    SelectAbility,
    UseToken,
    RerollBonusDie,
    ResolveChoice,
    SkipWindow,
    AdvancePhase,
    PlayCard,
    PayRemovalCost,
);

/// A command issued by one player. `timestamp` is carried for hosts and
/// replays; the rules never read it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    pub player: PlayerId,
    pub kind: CommandKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: u64,
}

impl Command {
    pub fn new(player: PlayerId, kind: impl Into<CommandKind>) -> Self {
        Self {
            player,
            kind: kind.into(),
            timestamp: 0,
        }
    }

    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}
