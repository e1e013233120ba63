//! Dice pools and the trigger matcher.
//!
//! Every die carries its numeric value (1–6) and the face symbol it resolves to
//! on the rolling hero's dice. Matching is a pure function of the pool and the
//! current phase, so hosts can pre-compute legal abilities before a player
//! commits to one.

mod matcher;
mod trigger;

pub use matcher::{AbilityMatch, MatchError, legal_abilities, select_variant};
pub use trigger::{TriggerCondition, TriggerContext};

use crate::state::Symbol;

/// A single resolved die.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Die {
    pub value: u8,
    pub symbol: Symbol,
}

impl Die {
    pub fn new(value: u8, symbol: impl Into<Symbol>) -> Self {
        Self {
            value,
            symbol: symbol.into(),
        }
    }
}

/// Counts dice showing `symbol`.
pub fn count_symbol(dice: &[Die], symbol: &Symbol) -> u32 {
    dice.iter().filter(|die| &die.symbol == symbol).count() as u32
}

/// Returns the length of the longest run of consecutive distinct values.
pub fn longest_run(dice: &[Die]) -> usize {
    let mut values: Vec<u8> = dice.iter().map(|die| die.value).collect();
    values.sort_unstable();
    values.dedup();

    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<u8> = None;
    for value in values {
        run = match previous {
            Some(p) if p + 1 == value => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(value);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(values: &[u8]) -> Vec<Die> {
        values.iter().map(|&v| Die::new(v, "x")).collect()
    }

    #[test]
    fn longest_run_ignores_duplicates() {
        assert_eq!(longest_run(&values(&[1, 2, 2, 3, 4])), 4);
        assert_eq!(longest_run(&values(&[6, 5, 4, 3, 2])), 5);
        assert_eq!(longest_run(&values(&[1, 3, 5, 6, 6])), 2);
        assert_eq!(longest_run(&[]), 0);
    }

    #[test]
    fn counts_symbols() {
        let dice = vec![Die::new(1, "sword"), Die::new(2, "sword"), Die::new(6, "heart")];
        assert_eq!(count_symbol(&dice, &Symbol::from("sword")), 2);
        assert_eq!(count_symbol(&dice, &Symbol::from("fist")), 0);
    }
}
