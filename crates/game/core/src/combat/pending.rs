use crate::state::{CustomActionId, TokenId};

/// What changed a pending damage value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModificationSource {
    /// Base damage from the attacking ability.
    Ability,
    /// Additive status modifier (e.g. a debuff on the defender).
    Status(TokenId),
    /// Token spent by the attacker during the boost window.
    AttackerToken(TokenId),
    /// Token spent by the defender during the mitigation window.
    DefenderToken(TokenId),
    Custom(CustomActionId),
    Shield,
    /// Reduction applied after finalisation, before HP is lost.
    Prevention,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageModification {
    pub source: ModificationSource,
    pub delta: i32,
}

/// Result of finalising pending damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageResolution {
    pub original: u32,
    pub final_amount: u32,
    pub absorbed: u32,
}

/// Damage threaded through an attack and its response windows.
///
/// The running value may dip below zero while modifiers accumulate; it is
/// floored only when the damage is finalised.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingDamage {
    original: u32,
    current: i32,
    evaded: bool,
    modifications: Vec<DamageModification>,
    final_amount: Option<u32>,
}

impl PendingDamage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending damage that is finalised without modifiers or shields.
    pub fn direct(amount: u32) -> Self {
        let mut pending = Self::new();
        pending.add_base(amount);
        pending.finalize(0, true);
        pending
    }

    pub fn original(&self) -> u32 {
        self.original
    }

    /// Running value, floored at zero.
    pub fn current(&self) -> u32 {
        self.current.max(0) as u32
    }

    pub fn is_evaded(&self) -> bool {
        self.evaded
    }

    pub fn is_finalized(&self) -> bool {
        self.final_amount.is_some()
    }

    pub fn final_amount(&self) -> Option<u32> {
        self.final_amount
    }

    pub fn modifications(&self) -> &[DamageModification] {
        &self.modifications
    }

    /// Damage that lands, or would land if resolved now.
    pub fn dealt(&self) -> u32 {
        match self.final_amount {
            Some(amount) => amount,
            None if self.evaded => 0,
            None => self.current(),
        }
    }

    /// The attack connects: not evaded and above zero.
    pub fn is_hit(&self) -> bool {
        !self.evaded && self.dealt() > 0
    }

    pub fn add_base(&mut self, amount: u32) {
        if self.guard_finalized("add_base") {
            return;
        }
        self.original = self.original.saturating_add(amount);
        self.current = self.current.saturating_add(amount as i32);
        self.modifications.push(DamageModification {
            source: ModificationSource::Ability,
            delta: amount as i32,
        });
    }

    pub fn apply_modifier(&mut self, source: ModificationSource, delta: i32) {
        if self.guard_finalized("apply_modifier") {
            return;
        }
        self.current = self.current.saturating_add(delta);
        self.modifications.push(DamageModification { source, delta });
    }

    pub fn evade(&mut self, source: ModificationSource) {
        if self.guard_finalized("evade") {
            return;
        }
        self.evaded = true;
        self.modifications.push(DamageModification { source, delta: 0 });
    }

    /// Applies shield absorption and the zero floor. `shield` is the holder's
    /// whole pool; the caller empties it when `absorbed` is reported.
    pub fn finalize(&mut self, shield: u32, ignore_shields: bool) -> DamageResolution {
        if let Some(final_amount) = self.final_amount {
            return DamageResolution {
                original: self.original,
                final_amount,
                absorbed: 0,
            };
        }

        let running = if self.evaded { 0 } else { self.current() };
        let absorbed = if ignore_shields { 0 } else { shield.min(running) };
        if absorbed > 0 {
            self.modifications.push(DamageModification {
                source: ModificationSource::Shield,
                delta: -(absorbed as i32),
            });
        }
        let final_amount = running - absorbed;
        self.final_amount = Some(final_amount);

        DamageResolution {
            original: self.original,
            final_amount,
            absorbed,
        }
    }

    /// Reduces damage that has not hit yet. `None` prevents all of it.
    pub fn prevent(&mut self, amount: Option<u32>) -> u32 {
        let available = self.dealt();
        let prevented = amount.map_or(available, |amount| amount.min(available));
        if prevented == 0 {
            return 0;
        }
        match self.final_amount.as_mut() {
            Some(final_amount) => *final_amount -= prevented,
            None => self.current -= prevented as i32,
        }
        self.modifications.push(DamageModification {
            source: ModificationSource::Prevention,
            delta: -(prevented as i32),
        });
        prevented
    }

    fn guard_finalized(&self, operation: &'static str) -> bool {
        if self.final_amount.is_some() {
            tracing::warn!(operation, "ignored change to finalized damage");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_damage_is_never_negative() {
        for base in 0..12u32 {
            for additive in -4..5i32 {
                for mitigation in 0..10i32 {
                    for shield in 0..4u32 {
                        let mut pending = PendingDamage::new();
                        pending.add_base(base);
                        pending.apply_modifier(
                            ModificationSource::Status("targeted".into()),
                            additive,
                        );
                        pending.apply_modifier(
                            ModificationSource::DefenderToken("taiji".into()),
                            -mitigation,
                        );
                        let resolution = pending.finalize(shield, false);

                        let expected = (base as i32 + additive - mitigation).max(0) as u32;
                        let expected = expected - shield.min(expected);
                        assert_eq!(resolution.final_amount, expected);
                        assert_eq!(resolution.original, base);
                    }
                }
            }
        }
    }

    #[test]
    fn evaded_damage_finalizes_to_zero_and_is_not_a_hit() {
        let mut pending = PendingDamage::new();
        pending.add_base(6);
        assert!(pending.is_hit());
        pending.evade(ModificationSource::DefenderToken("evasive".into()));
        assert!(!pending.is_hit());

        let resolution = pending.finalize(3, false);
        assert_eq!(resolution.final_amount, 0);
        assert_eq!(resolution.absorbed, 0);
    }

    #[test]
    fn ultimate_ignores_shields() {
        let mut pending = PendingDamage::new();
        pending.add_base(5);
        assert_eq!(pending.finalize(4, true).final_amount, 5);
    }

    #[test]
    fn finalized_damage_rejects_modifiers_but_accepts_prevention() {
        let mut pending = PendingDamage::new();
        pending.add_base(8);
        pending.finalize(0, false);

        pending.apply_modifier(ModificationSource::Ability, 5);
        assert_eq!(pending.dealt(), 8);

        assert_eq!(pending.prevent(Some(3)), 3);
        assert_eq!(pending.dealt(), 5);
        assert_eq!(pending.prevent(None), 5);
        assert_eq!(pending.final_amount(), Some(0));
        assert!(!pending.is_hit());
    }

    #[test]
    fn direct_damage_is_final_immediately() {
        let pending = PendingDamage::direct(3);
        assert_eq!(pending.final_amount(), Some(3));
        assert_eq!(pending.original(), 3);
    }
}
