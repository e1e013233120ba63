//! Completeness audit over hero data and the custom action registry.
//!
//! Table construction stops at the first malformed definition. The audit
//! instead collects every problem it can find, and additionally checks the
//! registry in both directions: each custom id the data references must be
//! registered, and each registered id must be referenced somewhere.

use std::collections::{BTreeMap, BTreeSet};

use duel_core::ability::{DefinitionError, EffectAction, HeroDefinition};
use duel_core::registry::CustomActionRegistry;
use duel_core::state::{CustomActionId, TokenId};
use duel_core::token::{PassiveAction, TokenDefinition};

/// One problem found by [`audit`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuditFinding {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("'{owner}' references unregistered custom action '{action}'")]
    Unregistered {
        owner: String,
        action: CustomActionId,
    },

    #[error("custom action '{0}' is registered but never referenced")]
    Unreferenced(CustomActionId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    fn push(&mut self, finding: impl Into<AuditFinding>) {
        let finding = finding.into();
        tracing::error!(%finding, "content audit finding");
        self.findings.push(finding);
    }
}

/// Audits hero and token definitions against `registry`.
pub fn audit(
    heroes: &[HeroDefinition],
    tokens: &[TokenDefinition],
    registry: &CustomActionRegistry,
) -> AuditReport {
    let mut report = AuditReport::default();

    let mut catalogue = BTreeMap::new();
    for token in tokens {
        if let Err(error) = token.validate() {
            report.push(error);
        }
        if catalogue.insert(token.id.clone(), token.clone()).is_some() {
            report.push(DefinitionError::DuplicateToken(token.id.clone()));
        }
    }

    let mut hero_ids = BTreeSet::new();
    for hero in heroes {
        if !hero_ids.insert(&hero.id) {
            report.push(DefinitionError::DuplicateHero(hero.id.clone()));
        }
        // Priority, dice count, token and ability references.
        if let Err(error) = hero.validate(&catalogue) {
            report.push(error);
        }
    }

    let referenced = referenced_actions(heroes, tokens);
    for (action, owners) in &referenced {
        if !registry.contains(action) {
            for owner in owners {
                report.push(AuditFinding::Unregistered {
                    owner: owner.clone(),
                    action: action.clone(),
                });
            }
        }
    }
    for id in registry.ids() {
        if !referenced.contains_key(id) {
            report.push(AuditFinding::Unreferenced(id.clone()));
        }
    }

    tracing::info!(
        heroes = heroes.len(),
        tokens = tokens.len(),
        custom_actions = registry.len(),
        findings = report.findings.len(),
        "content audit finished"
    );
    report
}

/// Every custom action id mentioned by abilities, cards and token passives,
/// with the definitions mentioning it.
pub fn referenced_actions(
    heroes: &[HeroDefinition],
    tokens: &[TokenDefinition],
) -> BTreeMap<CustomActionId, BTreeSet<String>> {
    let mut referenced: BTreeMap<CustomActionId, BTreeSet<String>> = BTreeMap::new();
    let mut note = |action: &CustomActionId, owner: String| {
        referenced.entry(action.clone()).or_default().insert(owner);
    };

    for hero in heroes {
        for ability in &hero.abilities {
            for effect in ability.all_effects() {
                effect.action.walk(&mut |nested| {
                    if let EffectAction::Custom { action, .. } = nested {
                        note(action, format!("{}/{}", hero.id, ability.id));
                    }
                });
            }
        }
        for card in &hero.cards {
            for action in &card.effects {
                action.walk(&mut |nested| {
                    if let EffectAction::Custom { action, .. } = nested {
                        note(action, format!("{}/{}", hero.id, card.id));
                    }
                });
            }
        }
    }

    for token in tokens {
        let Some(passive) = &token.passive_trigger else {
            continue;
        };
        for action in &passive.actions {
            if let PassiveAction::Custom { action, .. } = action {
                note(action, token_owner(&token.id));
            }
        }
    }
    referenced
}

fn token_owner(id: &TokenId) -> String {
    format!("token/{id}")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use duel_core::ability::{AbilityDefinition, AbilityEffect, AbilityKind, EffectTiming};
    use duel_core::dice::TriggerCondition;
    use duel_core::registry::{ActionMetadata, CustomActionContext, CustomDelta, HandlerError};
    use duel_core::state::Symbol;
    use duel_core::token::TokenCategory;

    use super::*;

    fn noop(_: &mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError> {
        Ok(Vec::new())
    }

    fn hero(custom: &str) -> HeroDefinition {
        HeroDefinition {
            id: "tester".into(),
            name: String::new(),
            dice_faces: ["a", "a", "b", "b", "c", "d"]
                .into_iter()
                .map(Symbol::from)
                .collect(),
            abilities: vec![AbilityDefinition::single(
                "poke",
                AbilityKind::Offensive,
                TriggerCondition::dice_set([("a", 2)]),
                vec![AbilityEffect::new(
                    EffectAction::Custom {
                        action: custom.into(),
                        params: BTreeMap::new(),
                    },
                    EffectTiming::WithDamage,
                )],
            )],
            loadout: vec!["poke".into()],
            cards: Vec::new(),
        }
    }

    #[test]
    fn missing_and_unused_handlers_are_reported() {
        let mut registry = CustomActionRegistry::new();
        registry
            .register("tester.idle", ActionMetadata::default(), noop)
            .unwrap();

        let report = audit(&[hero("tester.poke")], &[], &registry);
        assert_eq!(report.findings.len(), 2);
        assert!(report.findings.contains(&AuditFinding::Unregistered {
            owner: "tester/poke".into(),
            action: "tester.poke".into(),
        }));
        assert!(
            report
                .findings
                .contains(&AuditFinding::Unreferenced("tester.idle".into()))
        );
    }

    #[test]
    fn matching_registry_is_clean() {
        let mut registry = CustomActionRegistry::new();
        registry
            .register("tester.poke", ActionMetadata::default(), noop)
            .unwrap();
        assert!(audit(&[hero("tester.poke")], &[], &registry).is_clean());
    }

    #[test]
    fn every_malformed_token_is_reported() {
        let tokens = vec![
            TokenDefinition::new("empty", TokenCategory::Buff, 0),
            TokenDefinition::new("mark", TokenCategory::Unique, 3),
            TokenDefinition::new("mark", TokenCategory::Unique, 1),
        ];
        let report = audit(&[], &tokens, &CustomActionRegistry::new());
        assert_eq!(
            report.findings,
            vec![
                AuditFinding::Definition(DefinitionError::ZeroStackLimit("empty".into())),
                AuditFinding::Definition(DefinitionError::UniqueStackLimit {
                    token: "mark".into(),
                    limit: 3,
                }),
                AuditFinding::Definition(DefinitionError::DuplicateToken("mark".into())),
            ]
        );
    }
}
