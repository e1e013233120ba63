//! Shared builders for unit tests.
pub mod fixtures;
