//! Interaction and response window coordinator.
//!
//! While an [`Interaction`] is open the engine only admits its owner's
//! interaction commands. Windows run `Idle → AttackerBoost →
//! DefenderMitigation → Resolved` inside an attack; choices and bonus-die
//! re-rolls are raised by effects and queue whatever actions were still
//! waiting behind them as follow-ups.
mod prompt;
mod window;

pub use prompt::{finish_bonus_roll, reroll_bonus_die, resolve_choice};
pub(crate) use prompt::reroll_available;
pub use window::{WindowKind, advance_window, close_window, spend_window_token, window_tokens};

use crate::ability::{ChoiceOption, EffectAction, RollOutcome};
use crate::dice::Die;
use crate::event::{DomainEvent, InteractionKind};
use crate::resolve::{ActionScope, ResolveCtx, ResolveError, drive, run_actions};
use crate::state::PlayerId;

/// A forced choice between mutually exclusive option lists.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingChoice {
    pub owner: PlayerId,
    pub options: Vec<ChoiceOption>,
    pub scope: ActionScope,
    /// Actions that were queued behind the choice.
    pub followups: Vec<EffectAction>,
}

/// Bonus dice waiting for optional re-rolls before their outcomes apply.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingBonusRoll {
    pub owner: PlayerId,
    pub dice: Vec<Die>,
    pub outcomes: Vec<RollOutcome>,
    pub scope: ActionScope,
    pub followups: Vec<EffectAction>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interaction {
    ResponseWindow { owner: PlayerId, kind: WindowKind },
    Choice(PendingChoice),
    BonusDiceReroll(PendingBonusRoll),
}

impl Interaction {
    pub fn owner(&self) -> PlayerId {
        match self {
            Interaction::ResponseWindow { owner, .. } => *owner,
            Interaction::Choice(choice) => choice.owner,
            Interaction::BonusDiceReroll(roll) => roll.owner,
        }
    }

    pub fn kind(&self) -> InteractionKind {
        match self {
            Interaction::ResponseWindow { kind, .. } => (*kind).into(),
            Interaction::Choice(_) => InteractionKind::Choice,
            Interaction::BonusDiceReroll(_) => InteractionKind::BonusDiceReroll,
        }
    }

    /// Queue for actions deferred behind this interaction. Windows have none.
    pub fn followups_mut(&mut self) -> Option<&mut Vec<EffectAction>> {
        match self {
            Interaction::ResponseWindow { .. } => None,
            Interaction::Choice(choice) => Some(&mut choice.followups),
            Interaction::BonusDiceReroll(roll) => Some(&mut roll.followups),
        }
    }
}

/// The interaction currently suspending normal command processing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InteractionState {
    pub current: Option<Interaction>,
}

impl InteractionState {
    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.current.as_ref().map(Interaction::owner)
    }

    pub fn kind(&self) -> Option<InteractionKind> {
        self.current.as_ref().map(Interaction::kind)
    }
}

pub(crate) fn open(ctx: &mut ResolveCtx<'_, '_>, interaction: Interaction) {
    let owner = interaction.owner();
    let kind = interaction.kind();
    if let Some(previous) = ctx.state.interaction.current.as_ref() {
        tracing::warn!(previous = %previous.kind(), next = %kind, "replacing an open interaction");
    }
    tracing::debug!(%owner, %kind, "interaction requested");
    ctx.state.interaction.current = Some(interaction);
    ctx.emit(DomainEvent::InteractionRequested { owner, kind });
}

pub(crate) fn close(ctx: &mut ResolveCtx<'_, '_>) -> Option<Interaction> {
    let interaction = ctx.state.interaction.current.take()?;
    let owner = interaction.owner();
    let kind = interaction.kind();
    tracing::debug!(%owner, %kind, "interaction closed");
    ctx.emit(DomainEvent::InteractionClosed { owner, kind });
    Some(interaction)
}

/// Runs actions released by a closed interaction, then resumes the attack.
pub(crate) fn resume_with(
    ctx: &mut ResolveCtx<'_, '_>,
    scope: &ActionScope,
    actions: &[EffectAction],
) -> Result<(), ResolveError> {
    if run_actions(ctx, scope, actions)?.is_suspended() {
        return Ok(());
    }
    drive(ctx)
}

/// Closes the open window or bonus roll. Choices cannot be skipped.
pub fn skip(ctx: &mut ResolveCtx<'_, '_>) -> Result<(), ResolveError> {
    match ctx.state.interaction.current {
        Some(Interaction::ResponseWindow { .. }) => close_window(ctx),
        Some(Interaction::BonusDiceReroll(_)) => finish_bonus_roll(ctx),
        Some(Interaction::Choice(_)) | None => Ok(()),
    }
}
