//! Content loaders for reading hero data from files.
//!
//! Heroes and tokens are RON, rules tunables are TOML. Loaders only parse;
//! cross-definition validation happens when the core tables are built and in
//! [`crate::audit`].

pub mod builtin;
pub mod config;
pub mod factory;
pub mod heroes;

pub use builtin::builtin;
pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory};
pub use heroes::{HeroLoader, TokenCatalog, TokenLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
