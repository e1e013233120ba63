//! Damage calculation pipeline.
//!
//! Fixed order: base ability value, status additive modifiers, attacker token
//! modifiers, defender token modifiers (including roll-to-negate), shield
//! absorption, floor at zero. [`PendingDamage`] is the only type allowed to
//! change a pending value; everything else calls its methods.

mod pending;

pub use pending::{DamageModification, DamageResolution, ModificationSource, PendingDamage};

use crate::env::HeroOracle;
use crate::state::TokenId;
use crate::token::{LedgerError, ModifierDirection, TokenLedger};

/// Applies held status modifiers: the attacker's outgoing and the defender's
/// incoming. Zero-damage and evaded attacks are left untouched.
///
/// Returns the modifiers that were applied, in application order.
pub fn apply_status_modifiers<O>(
    pending: &mut PendingDamage,
    attacker: &TokenLedger,
    defender: &TokenLedger,
    oracle: &O,
) -> Result<Vec<(TokenId, i32)>, LedgerError>
where
    O: HeroOracle + ?Sized,
{
    let mut applied = Vec::new();
    if pending.original() == 0 || pending.is_evaded() {
        return Ok(applied);
    }

    let sides = [
        (attacker, ModifierDirection::Outgoing),
        (defender, ModifierDirection::Incoming),
    ];
    for (ledger, direction) in sides {
        for (token, stacks) in ledger.iter() {
            let definition = oracle
                .token(token)
                .ok_or_else(|| LedgerError::UnknownToken(token.clone()))?;
            let Some(modifier) = &definition.damage_modifier else {
                continue;
            };
            if modifier.direction != direction {
                continue;
            }
            let delta = modifier.delta(stacks);
            pending.apply_modifier(ModificationSource::Status(token.clone()), delta);
            applied.push((token.clone(), delta));
        }
    }

    tracing::trace!(?applied, current = pending.current(), "status modifiers applied");
    Ok(applied)
}
