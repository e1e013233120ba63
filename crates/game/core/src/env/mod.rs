//! Traits describing read-only match data.
//!
//! Oracles expose hero definitions, the token catalogue, the rules
//! configuration and the custom action registry. The [`Env`] aggregate bundles
//! them so the engine can access everything it needs without hard coupling to
//! concrete implementations.
mod config;
mod error;
mod heroes;
mod rng;

pub use config::ConfigOracle;
pub use error::OracleError;
pub use heroes::{HeroOracle, HeroTables};
pub use rng::{PcgRandom, QueuedRandom, RandomFn, compute_seed, shuffle};

use crate::registry::CustomActionRegistry;

/// Aggregates read-only oracles required by the engine and resolution pipeline.
pub struct Env<'a, H, C>
where
    H: HeroOracle + ?Sized,
    C: ConfigOracle + ?Sized,
{
    heroes: Option<&'a H>,
    config: Option<&'a C>,
    registry: Option<&'a CustomActionRegistry>,
}

pub type GameEnv<'a> = Env<'a, dyn HeroOracle + 'a, dyn ConfigOracle + 'a>;

impl<H, C> Clone for Env<'_, H, C>
where
    H: HeroOracle + ?Sized,
    C: ConfigOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<H, C> Copy for Env<'_, H, C>
where
    H: HeroOracle + ?Sized,
    C: ConfigOracle + ?Sized,
{
}

impl<'a, H, C> Env<'a, H, C>
where
    H: HeroOracle + ?Sized,
    C: ConfigOracle + ?Sized,
{
    pub fn new(
        heroes: Option<&'a H>,
        config: Option<&'a C>,
        registry: Option<&'a CustomActionRegistry>,
    ) -> Self {
        Self {
            heroes,
            config,
            registry,
        }
    }

    pub fn with_all(heroes: &'a H, config: &'a C, registry: &'a CustomActionRegistry) -> Self {
        Self::new(Some(heroes), Some(config), Some(registry))
    }

    pub fn empty() -> Self {
        Self {
            heroes: None,
            config: None,
            registry: None,
        }
    }

    /// Returns the HeroOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::HeroesNotAvailable` if no hero oracle was provided.
    pub fn heroes(&self) -> Result<&'a H, OracleError> {
        self.heroes.ok_or(OracleError::HeroesNotAvailable)
    }

    /// Returns the ConfigOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ConfigNotAvailable` if no config oracle was provided.
    pub fn config(&self) -> Result<&'a C, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }

    /// Returns the custom action registry, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RegistryNotAvailable` if no registry was provided.
    pub fn registry(&self) -> Result<&'a CustomActionRegistry, OracleError> {
        self.registry.ok_or(OracleError::RegistryNotAvailable)
    }
}

impl<'a, H, C> Env<'a, H, C>
where
    H: HeroOracle + 'a,
    C: ConfigOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameEnv` (consumes self).
    pub fn into_game_env(self) -> GameEnv<'a> {
        let heroes: Option<&'a dyn HeroOracle> = self.heroes.map(|heroes| heroes as _);
        let config: Option<&'a dyn ConfigOracle> = self.config.map(|config| config as _);
        Env::new(heroes, config, self.registry)
    }
}

impl<'a> GameEnv<'a> {
    /// Builds a trait-object environment directly from concrete oracles.
    pub fn from_parts(
        heroes: &'a dyn HeroOracle,
        config: &'a dyn ConfigOracle,
        registry: &'a CustomActionRegistry,
    ) -> Self {
        Env::with_all(heroes, config, registry)
    }
}
