/// Rules configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Hit points each hero starts with. Healing never exceeds this value.
    pub starting_hp: u32,
    /// Combat points each player starts with.
    pub starting_cp: u32,
    /// Hard ceiling on combat points.
    pub max_cp: u32,
    /// Combat points gained during the income phase.
    pub income_cp: u32,
    /// Number of rolls available during the offensive roll phase.
    pub offensive_roll_attempts: u8,
    /// Cards drawn when the match is set up.
    pub starting_hand: u8,
    /// Whether the first player skips income on the very first turn.
    pub first_player_skips_income: bool,
    /// Maximum nesting of passive triggers firing other passive triggers.
    pub max_trigger_depth: u8,
}

impl RulesConfig {
    // ===== compile-time constants used as type parameters =====
    /// Dice in an offensive roll.
    pub const MAX_DICE: usize = 5;
    /// Sides on every die.
    pub const DIE_SIDES: u32 = 6;
    /// Bonus dice a single `RollDie` action may throw.
    pub const MAX_BONUS_DICE: usize = 5;
    /// Number of seats at the table.
    pub const PLAYER_COUNT: usize = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_STARTING_HP: u32 = 50;
    pub const DEFAULT_STARTING_CP: u32 = 2;
    pub const DEFAULT_MAX_CP: u32 = 15;
    pub const DEFAULT_INCOME_CP: u32 = 1;
    pub const DEFAULT_OFFENSIVE_ROLL_ATTEMPTS: u8 = 3;
    pub const DEFAULT_STARTING_HAND: u8 = 4;
    pub const DEFAULT_MAX_TRIGGER_DEPTH: u8 = 8;

    pub fn new() -> Self {
        Self {
            starting_hp: Self::DEFAULT_STARTING_HP,
            starting_cp: Self::DEFAULT_STARTING_CP,
            max_cp: Self::DEFAULT_MAX_CP,
            income_cp: Self::DEFAULT_INCOME_CP,
            offensive_roll_attempts: Self::DEFAULT_OFFENSIVE_ROLL_ATTEMPTS,
            starting_hand: Self::DEFAULT_STARTING_HAND,
            first_player_skips_income: true,
            max_trigger_depth: Self::DEFAULT_MAX_TRIGGER_DEPTH,
        }
    }

    pub fn with_starting_hp(mut self, starting_hp: u32) -> Self {
        self.starting_hp = starting_hp;
        self
    }

    pub fn with_starting_hand(mut self, starting_hand: u8) -> Self {
        self.starting_hand = starting_hand;
        self
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}
