//! Custom action registry.
//!
//! Some hero rules are one-off and not worth generalising into the declarative
//! effect vocabulary. Those effects name a [`CustomActionId`]; the registry maps
//! each id to a handler registered at startup. Handlers never mutate state
//! themselves: they read a [`CustomActionContext`] and return
//! [`CustomDelta`]s that the resolution pipeline applies.
mod delta;

pub use delta::CustomDelta;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::combat::PendingDamage;
use crate::dice::Die;
use crate::env::RandomFn;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{CustomActionId, MatchState, PlayerId};

bitflags! {
    /// Category tags used by the completeness audit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ActionCategories: u8 {
        const DAMAGE     = 1 << 0;
        const HEAL       = 1 << 1;
        const TOKENS     = 1 << 2;
        const RESOURCES  = 1 << 3;
        const DEFENSE    = 1 << 4;
        const PREVENTION = 1 << 5;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionMetadata {
    pub categories: ActionCategories,
    pub description: &'static str,
}

impl ActionMetadata {
    pub fn new(categories: ActionCategories, description: &'static str) -> Self {
        Self {
            categories,
            description,
        }
    }
}

/// Read-only view handed to a custom action handler.
pub struct CustomActionContext<'a> {
    pub actor: PlayerId,
    pub opponent: PlayerId,
    pub state: &'a MatchState,
    /// Damage in flight, if the action runs inside a damage flow.
    pub pending: Option<&'a PendingDamage>,
    /// Dice that triggered the surrounding ability (empty for cards and passives).
    pub dice: &'a [Die],
    /// Stacks of the token whose passive fired, if any.
    pub stacks: u8,
    pub params: &'a BTreeMap<String, i32>,
    pub rng: &'a mut dyn RandomFn,
}

impl CustomActionContext<'_> {
    pub fn param(&self, name: &str) -> Option<i32> {
        self.params.get(name).copied()
    }

    pub fn param_or(&self, name: &str, default: i32) -> i32 {
        self.param(name).unwrap_or(default)
    }

    /// Reads a required parameter.
    pub fn require(&self, name: &'static str) -> Result<i32, HandlerError> {
        self.param(name).ok_or(HandlerError::MissingParam(name))
    }
}

/// Failure reported by a handler. Always a data-integrity problem.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("missing parameter '{0}'")]
    MissingParam(&'static str),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error("handler requires pending damage")]
    NoPendingDamage,
}

/// A hero-specific effect implementation.
pub trait CustomActionHandler: Send + Sync {
    fn handle(&self, ctx: &mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError>;
}

impl<F> CustomActionHandler for F
where
    F: Fn(&mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError> + Send + Sync,
{
    fn handle(&self, ctx: &mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError> {
        self(ctx)
    }
}

#[derive(Clone)]
pub struct RegisteredAction {
    pub handler: Arc<dyn CustomActionHandler>,
    pub metadata: ActionMetadata,
}

impl fmt::Debug for RegisteredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAction")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("custom action '{0}' is already registered")]
    Duplicate(CustomActionId),
}

impl GameError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            RegistryError::Duplicate(_) => "REGISTRY_DUPLICATE",
        }
    }
}

/// Closed map from identifier to handler, populated at startup.
#[derive(Clone, Debug, Default)]
pub struct CustomActionRegistry {
    actions: HashMap<CustomActionId, RegisteredAction>,
}

impl CustomActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(
        &mut self,
        id: impl Into<CustomActionId>,
        metadata: ActionMetadata,
        handler: H,
    ) -> Result<(), RegistryError>
    where
        H: CustomActionHandler + 'static,
    {
        let id = id.into();
        if self.actions.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        tracing::debug!(action = %id, "custom action registered");
        self.actions.insert(
            id,
            RegisteredAction {
                handler: Arc::new(handler),
                metadata,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: &CustomActionId) -> Option<&RegisteredAction> {
        self.actions.get(id)
    }

    pub fn contains(&self, id: &CustomActionId) -> bool {
        self.actions.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&CustomActionId> {
        let mut ids: Vec<_> = self.actions.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
