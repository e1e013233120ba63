//! Trigger conditions for abilities and variants.

use std::collections::BTreeMap;

use crate::state::{Phase, Symbol};

use super::{Die, count_symbol, longest_run};

/// The dice/phase condition that makes an ability or variant eligible.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerCondition {
    /// Minimum count per face symbol. Excess dice of a face are allowed.
    DiceSet(BTreeMap<Symbol, u8>),

    /// Four consecutive distinct values.
    SmallStraight,

    /// Five consecutive distinct values.
    LargeStraight,

    /// Fires in a named phase; `dice_count` sizes the roll (defensive abilities).
    Phase { phase: Phase, dice_count: u8 },

    /// One of each listed symbol, in any order.
    AllSymbolsPresent(Vec<Symbol>),
}

/// Inputs the matcher evaluates triggers against.
#[derive(Clone, Copy, Debug)]
pub struct TriggerContext<'a> {
    pub dice: &'a [Die],
    pub phase: Phase,
}

impl<'a> TriggerContext<'a> {
    pub fn new(dice: &'a [Die], phase: Phase) -> Self {
        Self { dice, phase }
    }
}

impl TriggerCondition {
    /// Builds a `DiceSet` trigger from `(symbol, count)` pairs.
    pub fn dice_set<'s>(pairs: impl IntoIterator<Item = (&'s str, u8)>) -> Self {
        Self::DiceSet(
            pairs
                .into_iter()
                .map(|(symbol, count)| (Symbol::from(symbol), count))
                .collect(),
        )
    }

    /// Returns true when the trigger is satisfied. Pure; never mutates anything.
    pub fn is_satisfied(&self, ctx: &TriggerContext<'_>) -> bool {
        match self {
            Self::DiceSet(required) => required
                .iter()
                .all(|(symbol, &count)| count_symbol(ctx.dice, symbol) >= u32::from(count)),
            Self::SmallStraight => longest_run(ctx.dice) >= 4,
            Self::LargeStraight => longest_run(ctx.dice) >= 5,
            Self::Phase { phase, dice_count } => {
                *phase == ctx.phase
                    && (ctx.dice.is_empty() || ctx.dice.len() == usize::from(*dice_count))
            }
            Self::AllSymbolsPresent(symbols) => symbols
                .iter()
                .all(|symbol| ctx.dice.iter().any(|die| &die.symbol == symbol)),
        }
    }

    /// Dice to roll for phase triggers.
    pub fn dice_count(&self) -> Option<u8> {
        match self {
            Self::Phase { dice_count, .. } => Some(*dice_count),
            _ => None,
        }
    }

    /// Returns true for triggers evaluated against a rolled pool rather than a phase.
    pub fn is_dice_based(&self) -> bool {
        !matches!(self, Self::Phase { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(faces: &[(u8, &str)]) -> Vec<Die> {
        faces.iter().map(|&(v, s)| Die::new(v, s)).collect()
    }

    #[test]
    fn dice_set_requires_at_least_count() {
        let trigger = TriggerCondition::dice_set([("sword", 3)]);
        let two = pool(&[(1, "sword"), (2, "sword"), (4, "fist"), (5, "fist"), (6, "heart")]);
        let three = pool(&[(1, "sword"), (2, "sword"), (3, "sword"), (5, "fist"), (6, "heart")]);
        let five = pool(&[(1, "sword"), (2, "sword"), (3, "sword"), (1, "sword"), (2, "sword")]);

        let phase = Phase::OffensiveRoll;
        assert!(!trigger.is_satisfied(&TriggerContext::new(&two, phase)));
        assert!(trigger.is_satisfied(&TriggerContext::new(&three, phase)));
        assert!(trigger.is_satisfied(&TriggerContext::new(&five, phase)));
    }

    #[test]
    fn unrelated_dice_never_break_a_dice_set() {
        let trigger = TriggerCondition::dice_set([("sword", 2), ("heart", 1)]);
        let base = pool(&[(1, "sword"), (2, "sword"), (6, "heart")]);
        for extra in ["fist", "heart", "sword", "lotus"] {
            let mut dice = base.clone();
            dice.push(Die::new(4, extra));
            dice.push(Die::new(5, extra));
            assert!(trigger.is_satisfied(&TriggerContext::new(&dice, Phase::OffensiveRoll)));
        }
    }

    #[test]
    fn straights_use_distinct_values() {
        let small = pool(&[(2, "a"), (3, "a"), (4, "b"), (5, "c"), (5, "c")]);
        let large = pool(&[(2, "a"), (3, "a"), (4, "b"), (5, "c"), (6, "d")]);
        let phase = Phase::OffensiveRoll;

        assert!(TriggerCondition::SmallStraight.is_satisfied(&TriggerContext::new(&small, phase)));
        assert!(!TriggerCondition::LargeStraight.is_satisfied(&TriggerContext::new(&small, phase)));
        assert!(TriggerCondition::LargeStraight.is_satisfied(&TriggerContext::new(&large, phase)));
        assert!(TriggerCondition::SmallStraight.is_satisfied(&TriggerContext::new(&large, phase)));
    }

    #[test]
    fn all_symbols_present_is_order_independent() {
        let trigger =
            TriggerCondition::AllSymbolsPresent(vec!["fist".into(), "palm".into(), "lotus".into()]);
        let dice = pool(&[(6, "lotus"), (1, "fist"), (1, "fist"), (3, "palm"), (4, "taiji")]);
        assert!(trigger.is_satisfied(&TriggerContext::new(&dice, Phase::OffensiveRoll)));

        let missing = pool(&[(1, "fist"), (3, "palm"), (4, "taiji")]);
        assert!(!trigger.is_satisfied(&TriggerContext::new(&missing, Phase::OffensiveRoll)));
    }

    #[test]
    fn phase_trigger_checks_phase_and_dice_count() {
        let trigger = TriggerCondition::Phase {
            phase: Phase::DefensiveRoll,
            dice_count: 4,
        };
        let four = pool(&[(1, "a"), (2, "a"), (3, "a"), (4, "a")]);
        let three = pool(&[(1, "a"), (2, "a"), (3, "a")]);

        assert!(trigger.is_satisfied(&TriggerContext::new(&[], Phase::DefensiveRoll)));
        assert!(trigger.is_satisfied(&TriggerContext::new(&four, Phase::DefensiveRoll)));
        assert!(!trigger.is_satisfied(&TriggerContext::new(&three, Phase::DefensiveRoll)));
        assert!(!trigger.is_satisfied(&TriggerContext::new(&[], Phase::OffensiveRoll)));
        assert_eq!(trigger.dice_count(), Some(4));
    }
}
