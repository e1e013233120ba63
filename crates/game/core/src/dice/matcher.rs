//! Ability and variant selection.

use crate::ability::{AbilityDefinition, VariantRef};
use crate::error::{ErrorSeverity, GameError};
use crate::state::AbilityId;

use super::TriggerContext;

/// A satisfied ability together with the variant that won.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityMatch {
    pub ability: AbilityId,
    pub variant: Option<usize>,
    pub priority: i32,
}

impl AbilityMatch {
    pub fn variant_ref(&self) -> VariantRef {
        VariantRef::new(self.ability.clone(), self.variant)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Two satisfied variants share the winning priority. Definition
    /// validation rejects this at load; seeing it here means unvalidated data.
    #[error("ability '{ability}' has several satisfied variants at priority {priority}")]
    AmbiguousPriority { ability: AbilityId, priority: i32 },
}

impl GameError for MatchError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            MatchError::AmbiguousPriority { .. } => "MATCH_AMBIGUOUS_PRIORITY",
        }
    }
}

/// Selects the highest-priority satisfied variant, or `None` when nothing matches.
pub fn select_variant(
    ability: &AbilityDefinition,
    ctx: &TriggerContext<'_>,
) -> Result<Option<AbilityMatch>, MatchError> {
    let mut best: Option<AbilityMatch> = None;
    let mut tied = false;

    for entry in ability.triggers() {
        if !entry.trigger.is_satisfied(ctx) {
            continue;
        }
        match &best {
            Some(current) if entry.priority < current.priority => {}
            Some(current) if entry.priority == current.priority => tied = true,
            _ => {
                tied = false;
                best = Some(AbilityMatch {
                    ability: ability.id.clone(),
                    variant: entry.variant,
                    priority: entry.priority,
                });
            }
        }
    }

    if tied && let Some(best) = &best {
        return Err(MatchError::AmbiguousPriority {
            ability: best.ability.clone(),
            priority: best.priority,
        });
    }
    Ok(best)
}

/// Every ability in `abilities` whose trigger is satisfied right now.
///
/// Pure: hosts can call this to pre-compute legal choices before a player
/// commits to one.
pub fn legal_abilities<'a>(
    abilities: impl IntoIterator<Item = &'a AbilityDefinition>,
    ctx: &TriggerContext<'_>,
) -> Result<Vec<AbilityMatch>, MatchError> {
    let mut legal = Vec::new();
    for ability in abilities {
        if let Some(found) = select_variant(ability, ctx)? {
            legal.push(found);
        }
    }
    Ok(legal)
}
