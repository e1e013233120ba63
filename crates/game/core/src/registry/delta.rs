use crate::ability::Target;
use crate::state::TokenId;

/// State change requested by a custom action handler.
///
/// Targets are relative to the acting player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustomDelta {
    /// Contributes to pending damage during the damage build; direct damage otherwise.
    Damage { target: Target, amount: u32 },
    Heal { target: Target, amount: u32 },
    GrantToken { target: Target, token: TokenId, amount: u8 },
    /// Removes `amount` stacks, or all of them when `None`.
    RemoveToken {
        target: Target,
        token: TokenId,
        amount: Option<u8>,
    },
    GainCp { target: Target, amount: i32 },
    Shield { target: Target, amount: u32 },
    ModifyPendingDamage { delta: i32 },
    EvadePendingDamage,
    /// Prevents `amount` of the damage in flight, or all of it when `None`.
    PreventDamage { amount: Option<u32> },
}
