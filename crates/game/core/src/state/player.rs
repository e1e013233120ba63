use std::collections::BTreeMap;

use crate::token::TokenLedger;

use super::{AbilityId, CardId, HeroId, PlayerId};

/// Per-seat mutable state. Definitions are referenced by id only.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub id: PlayerId,
    pub hero: HeroId,
    pub hp: u32,
    pub max_hp: u32,
    pub cp: u32,
    pub tokens: TokenLedger,
    /// Current ability loadout, after upgrades.
    pub abilities: Vec<AbilityId>,
    /// Upgrade level per loadout slot; abilities absent here are level 1.
    pub ability_levels: BTreeMap<AbilityId, u8>,
    /// Damage absorbed by the next damage event this attack.
    pub shield: u32,
    pub hand: Vec<CardId>,
    pub deck: Vec<CardId>,
    pub discard: Vec<CardId>,
}

impl PlayerState {
    pub fn new(id: PlayerId, hero: HeroId, hp: u32, cp: u32) -> Self {
        Self {
            id,
            hero,
            hp,
            max_hp: hp,
            cp,
            tokens: TokenLedger::default(),
            abilities: Vec::new(),
            ability_levels: BTreeMap::new(),
            shield: 0,
            hand: Vec::new(),
            deck: Vec::new(),
            discard: Vec::new(),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    pub fn has_ability(&self, ability: &AbilityId) -> bool {
        self.abilities.contains(ability)
    }

    pub fn ability_level(&self, ability: &AbilityId) -> u8 {
        self.ability_levels.get(ability).copied().unwrap_or(1)
    }

    /// Restores HP up to the maximum and returns the amount actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }

    /// Removes HP, flooring at zero, and returns the amount actually lost.
    pub fn lose_hp(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_sub(amount);
        before - self.hp
    }

    /// Adjusts CP within `[0, max_cp]` and returns `(before, after)`.
    pub fn adjust_cp(&mut self, delta: i64, max_cp: u32) -> (u32, u32) {
        let before = self.cp;
        let after = (i64::from(before) + delta).clamp(0, i64::from(max_cp));
        self.cp = after as u32;
        (before, self.cp)
    }
}
