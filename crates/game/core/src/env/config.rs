//! Configuration oracle for exposing rules configuration to the engine.

use crate::config::RulesConfig;

/// Provides access to runtime rules configuration.
pub trait ConfigOracle: Send + Sync {
    fn rules(&self) -> &RulesConfig;

    /// Hit points each hero starts with.
    fn starting_hp(&self) -> u32 {
        self.rules().starting_hp
    }

    /// Hard ceiling on combat points.
    fn max_cp(&self) -> u32 {
        self.rules().max_cp
    }

    /// Maximum nesting of passive triggers.
    fn max_trigger_depth(&self) -> u8 {
        self.rules().max_trigger_depth
    }
}

impl ConfigOracle for RulesConfig {
    fn rules(&self) -> &RulesConfig {
        self
    }
}
