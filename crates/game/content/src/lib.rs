//! Built-in hero content, data loaders and the completeness audit.
//!
//! This crate houses the bundled hero and token data, the custom action
//! handlers those heroes need, and loaders for RON/TOML data files:
//! - Hero definitions (one RON file per hero)
//! - The global token catalogue (RON)
//! - Rules configuration (TOML)
//!
//! Content is consumed through the core oracles and never appears in match
//! state beyond the ids that reference it.

pub mod audit;
pub mod handlers;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use audit::{AuditFinding, AuditReport, audit};
pub use handlers::{builtin_registry, register_builtin};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, Content, ContentFactory, HeroLoader, LoadResult, TokenLoader, builtin,
};
