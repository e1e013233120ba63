//! Polling of passive triggers and active-use eligibility.

use crate::env::HeroOracle;
use crate::state::{Phase, TokenId};

use super::{
    ActiveUse, ActiveUseTiming, LedgerError, PassiveTiming, PassiveTrigger, TokenDefinition,
    TokenLedger,
};

/// A held token whose passive matched the firing event.
#[derive(Clone, Debug)]
pub struct TriggeredPassive<'a> {
    pub token: TokenId,
    pub stacks: u8,
    pub trigger: &'a PassiveTrigger,
}

/// Collects every held token whose passive fires for `timing` in `phase`.
///
/// Collection happens before any action is applied so that actions removing
/// or granting tokens cannot change which passives fire for this event.
pub fn triggered_passives<'a, O>(
    ledger: &TokenLedger,
    timing: PassiveTiming,
    phase: Phase,
    oracle: &'a O,
) -> Result<Vec<TriggeredPassive<'a>>, LedgerError>
where
    O: HeroOracle + ?Sized,
{
    let mut fired = Vec::new();
    for (token, stacks) in ledger.iter() {
        let definition = oracle
            .token(token)
            .ok_or_else(|| LedgerError::UnknownToken(token.clone()))?;
        let Some(trigger) = &definition.passive_trigger else {
            continue;
        };
        if trigger.timing != timing {
            continue;
        }
        if trigger.phase.is_some_and(|required| required != phase) {
            continue;
        }
        fired.push(TriggeredPassive {
            token: token.clone(),
            stacks,
            trigger,
        });
    }
    Ok(fired)
}

/// Held tokens that can pay for an active use at `timing`.
pub fn usable_tokens<'a, O>(
    ledger: &TokenLedger,
    timing: ActiveUseTiming,
    oracle: &'a O,
) -> Result<Vec<(&'a TokenDefinition, &'a ActiveUse)>, LedgerError>
where
    O: HeroOracle + ?Sized,
{
    let mut usable = Vec::new();
    for (token, stacks) in ledger.iter() {
        let definition = oracle
            .token(token)
            .ok_or_else(|| LedgerError::UnknownToken(token.clone()))?;
        if let Some(active) = definition.active_use_at(timing)
            && stacks >= active.cost
        {
            usable.push((definition, active));
        }
    }
    Ok(usable)
}
