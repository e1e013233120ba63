use std::collections::BTreeMap;

use crate::error::{ErrorSeverity, GameError};
use crate::state::TokenId;

use super::TokenDefinition;

/// Stack counts before and after a ledger operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackChange {
    pub before: u8,
    pub after: u8,
}

impl StackChange {
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LedgerError {
    #[error("token '{token}' has {have} stacks, {need} required")]
    InsufficientStacks { token: TokenId, have: u8, need: u8 },

    #[error("no definition for held token '{0}'")]
    UnknownToken(TokenId),
}

impl GameError for LedgerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            LedgerError::InsufficientStacks { .. } => ErrorSeverity::Validation,
            LedgerError::UnknownToken(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InsufficientStacks { .. } => "LEDGER_INSUFFICIENT_STACKS",
            LedgerError::UnknownToken(_) => "LEDGER_UNKNOWN_TOKEN",
        }
    }
}

/// Stack counters for one player. Counts always stay in `[0, stack_limit]`;
/// tokens at zero are not stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TokenLedger {
    stacks: BTreeMap<TokenId, u8>,
}

impl TokenLedger {
    pub fn stacks(&self, token: &TokenId) -> u8 {
        self.stacks.get(token).copied().unwrap_or(0)
    }

    pub fn has(&self, token: &TokenId, at_least: u8) -> bool {
        self.stacks(token) >= at_least.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Held tokens in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&TokenId, u8)> {
        self.stacks.iter().map(|(token, &stacks)| (token, stacks))
    }

    /// Adds stacks, clamping at the definition's limit.
    pub fn grant(&mut self, definition: &TokenDefinition, amount: u8) -> StackChange {
        let before = self.stacks(&definition.id);
        let after = before.saturating_add(amount).min(definition.stack_limit);
        self.set(&definition.id, after);
        StackChange { before, after }
    }

    /// Removes up to `amount` stacks, clamping at zero.
    pub fn consume(&mut self, token: &TokenId, amount: u8) -> StackChange {
        let before = self.stacks(token);
        let after = before.saturating_sub(amount);
        self.set(token, after);
        StackChange { before, after }
    }

    /// Removes exactly `cost` stacks or fails without touching the ledger.
    pub fn spend(&mut self, token: &TokenId, cost: u8) -> Result<StackChange, LedgerError> {
        let have = self.stacks(token);
        if have < cost {
            return Err(LedgerError::InsufficientStacks {
                token: token.clone(),
                have,
                need: cost,
            });
        }
        Ok(self.consume(token, cost))
    }

    pub fn remove_all(&mut self, token: &TokenId) -> StackChange {
        let before = self.stacks(token);
        self.stacks.remove(token);
        StackChange { before, after: 0 }
    }

    fn set(&mut self, token: &TokenId, stacks: u8) {
        if stacks == 0 {
            self.stacks.remove(token);
        } else {
            self.stacks.insert(token.clone(), stacks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenCategory;

    #[test]
    fn consumable_with_limit_one_granted_twice_reads_one() {
        let token = TokenDefinition::new("crit", TokenCategory::Consumable, 1);
        let mut ledger = TokenLedger::default();

        assert_eq!(ledger.grant(&token, 1), StackChange { before: 0, after: 1 });
        assert_eq!(ledger.grant(&token, 1), StackChange { before: 1, after: 1 });
        assert_eq!(ledger.stacks(&token.id), 1);
    }

    #[test]
    fn stacks_stay_within_bounds_for_any_operation_order() {
        let token = TokenDefinition::new("taiji", TokenCategory::Consumable, 5);
        let mut ledger = TokenLedger::default();

        // Deterministic pseudo-random sequence of grants and consumes.
        let mut x: u32 = 0x2545_f491;
        for _ in 0..500 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            let amount = (x % 7) as u8;
            if x & 0x100 == 0 {
                ledger.grant(&token, amount);
            } else {
                ledger.consume(&token.id, amount);
            }
            let stacks = ledger.stacks(&token.id);
            assert!(stacks <= token.stack_limit);
        }
    }

    #[test]
    fn spend_requires_enough_stacks() {
        let token = TokenDefinition::new("taiji", TokenCategory::Consumable, 5);
        let mut ledger = TokenLedger::default();
        ledger.grant(&token, 2);

        let err = ledger.spend(&token.id, 3).unwrap_err();
        assert_eq!(err.error_code(), "LEDGER_INSUFFICIENT_STACKS");
        assert_eq!(ledger.stacks(&token.id), 2);

        assert_eq!(ledger.spend(&token.id, 2).unwrap().after, 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn remove_all_clears_entry() {
        let token = TokenDefinition::new("poison", TokenCategory::Debuff, 3);
        let mut ledger = TokenLedger::default();
        ledger.grant(&token, 3);
        assert_eq!(ledger.remove_all(&token.id), StackChange { before: 3, after: 0 });
        assert_eq!(ledger.iter().count(), 0);
    }
}
