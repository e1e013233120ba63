//! Common error infrastructure for duel-core.
//!
//! This module provides shared types and traits used across all error types in duel-core.
//! Domain-specific errors (e.g., `LedgerError`, `ResolveError`) are defined in their
//! respective modules alongside the operations they guard.
//!
//! # Design Principles
//!
//! - **Two classes**: user-facing rejections (`Validation`, `Recoverable`) never mutate
//!   state and simply re-prompt; data-integrity failures (`Fatal`) mean hero data and
//!   interpreter are out of sync and must surface loudly
//! - **Rich Context**: Errors include player and nonce for debugging
//! - **Deterministic**: Retrying the same command yields the same error

use crate::state::PlayerId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: The command is legal in general but not right now (wrong phase, window open)
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Definition data and interpreter disagree (unregistered custom action,
///   malformed token)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the player can act differently and try again.
    ///
    /// Examples: not your turn, a response window is open
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: trigger not satisfied, not enough token stacks
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: attack stage without an attack, invariant violated after a command
    Internal,

    /// Fatal error - hero data cannot be interpreted.
    ///
    /// Examples: unknown custom action, missing token definition
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is a user-facing rejection.
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }

    /// Returns true if this error indicates a bug or a data-integrity failure.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Player that issued the failing command (if applicable).
    pub player: Option<PlayerId>,

    /// Match nonce at the time of error.
    pub nonce: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    /// Creates a new error context with the given nonce.
    #[must_use]
    pub const fn new(nonce: u64) -> Self {
        Self {
            player: None,
            nonce,
            message: None,
        }
    }

    /// Attaches a player to this context (builder pattern).
    #[must_use]
    pub const fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Attaches a static message to this context (builder pattern).
    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Common trait for all duel-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on who must fix the problem, not on impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
