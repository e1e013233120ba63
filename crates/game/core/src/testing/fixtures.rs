//! A small "knight" hero and token catalogue covering every mechanic the
//! engine tests exercise.
//!
//! Die faces: 1-3 sword, 4-5 fist, 6 heart.

use std::collections::BTreeMap;

use crate::ability::{
    AbilityDefinition, AbilityEffect, AbilityKind, AbilityTags, Amount, CardDefinition,
    ChoiceOption, EffectAction, EffectCondition, EffectTiming, HeroDefinition, RollOutcome, Target,
};
use crate::config::RulesConfig;
use crate::dice::TriggerCondition;
use crate::env::{GameEnv, HeroOracle, HeroTables};
use crate::registry::{
    ActionCategories, ActionMetadata, CustomActionContext, CustomActionRegistry, CustomDelta,
    HandlerError,
};
use crate::state::{HeroId, MatchState, Phase, PlayerId, PlayerState, Symbol};
use crate::token::{
    ActiveUse, ActiveUseEffect, ActiveUseTiming, DamageModifier, ModifierDirection, PassiveAction,
    PassiveTiming, PassiveTrigger, StatKind, TokenCategory, TokenDefinition,
};

pub const KNIGHT: &str = "knight";
pub const DRAIN: &str = "knight.drain";
pub const BLESS: &str = "knight.bless";

fn effect(action: EffectAction, timing: EffectTiming) -> AbilityEffect {
    AbilityEffect::new(action, timing)
}

fn damage(amount: u32) -> EffectAction {
    EffectAction::Damage {
        amount: Amount::Fixed(amount),
    }
}

fn heal_self(amount: u32) -> EffectAction {
    EffectAction::Heal {
        amount: Amount::Fixed(amount),
        target: Target::SelfPlayer,
    }
}

pub fn tokens() -> Vec<TokenDefinition> {
    vec![
        TokenDefinition::new("taiji", TokenCategory::Consumable, 5).with_active_use(ActiveUse {
            timings: vec![
                ActiveUseTiming::BeforeDamageDealt,
                ActiveUseTiming::BeforeDamageReceived,
            ],
            cost: 1,
            effect: ActiveUseEffect::ModifyDamage { amount: 1 },
        }),
        TokenDefinition::new("evasive", TokenCategory::Consumable, 3).with_active_use(ActiveUse {
            timings: vec![ActiveUseTiming::BeforeDamageReceived],
            cost: 1,
            effect: ActiveUseEffect::RollToNegate { success_at_most: 2 },
        }),
        TokenDefinition::new("lucky", TokenCategory::Consumable, 2).with_active_use(ActiveUse {
            timings: vec![ActiveUseTiming::AfterBonusRoll],
            cost: 1,
            effect: ActiveUseEffect::RerollBonusDie,
        }),
        // Single-stack consumable, for limit clamping.
        TokenDefinition::new("resolve", TokenCategory::Consumable, 1),
        TokenDefinition::new("knockdown", TokenCategory::Debuff, 1).with_passive(PassiveTrigger {
            timing: PassiveTiming::OnPhaseEnter,
            phase: Some(Phase::OffensiveRoll),
            actions: vec![PassiveAction::SkipPhase],
            removable: true,
            removal_cost: None,
        }),
        TokenDefinition::new("burn", TokenCategory::Debuff, 3).with_passive(PassiveTrigger {
            timing: PassiveTiming::OnTurnStart,
            phase: None,
            actions: vec![PassiveAction::Damage {
                amount: 1,
                per_stack: true,
            }],
            removable: true,
            removal_cost: Some(2),
        }),
        TokenDefinition::new("targeted", TokenCategory::Debuff, 1).with_damage_modifier(
            DamageModifier {
                direction: ModifierDirection::Incoming,
                amount: 2,
                per_stack: false,
            },
        ),
        TokenDefinition::new("thorns", TokenCategory::Buff, 1).with_passive(PassiveTrigger {
            timing: PassiveTiming::OnDamageReceived,
            phase: None,
            actions: vec![PassiveAction::Damage {
                amount: 1,
                per_stack: false,
            }],
            removable: false,
            removal_cost: None,
        }),
        TokenDefinition::new("fury", TokenCategory::Buff, 3).with_damage_modifier(DamageModifier {
            direction: ModifierDirection::Outgoing,
            amount: 1,
            per_stack: true,
        }),
        // Spent by its own handler, only when it saves the holder.
        TokenDefinition::new("blessing", TokenCategory::Unique, 1).with_passive(PassiveTrigger {
            timing: PassiveTiming::OnDamageReceived,
            phase: None,
            actions: vec![PassiveAction::Custom {
                action: BLESS.into(),
                params: BTreeMap::new(),
            }],
            removable: false,
            removal_cost: None,
        }),
        TokenDefinition::new("frenzy", TokenCategory::Buff, 1).with_passive(PassiveTrigger {
            timing: PassiveTiming::OnAttackEnd,
            phase: None,
            actions: vec![PassiveAction::ExtraAttack],
            removable: true,
            removal_cost: None,
        }),
        TokenDefinition::new("momentum", TokenCategory::Buff, 2).with_passive(PassiveTrigger {
            timing: PassiveTiming::OnOffensiveRollEnd,
            phase: None,
            actions: vec![PassiveAction::ModifyStat {
                stat: StatKind::Cp,
                delta: 1,
                per_stack: true,
            }],
            removable: true,
            removal_cost: None,
        }),
    ]
}

pub fn knight() -> HeroDefinition {
    let abilities = vec![
        AbilityDefinition::single(
            "sword_strike",
            AbilityKind::Offensive,
            TriggerCondition::dice_set([("sword", 3)]),
            vec![effect(damage(4), EffectTiming::WithDamage)],
        ),
        AbilityDefinition::single(
            "sword_strike_ii",
            AbilityKind::Offensive,
            TriggerCondition::dice_set([("sword", 3)]),
            vec![effect(damage(6), EffectTiming::WithDamage)],
        ),
        AbilityDefinition::single(
            "crushing_blow",
            AbilityKind::Offensive,
            TriggerCondition::dice_set([("fist", 3)]),
            vec![
                effect(damage(3), EffectTiming::WithDamage),
                effect(
                    EffectAction::GrantStatus {
                        token: "knockdown".into(),
                        stacks: 1,
                        target: Target::Opponent,
                    },
                    EffectTiming::PostDamage,
                )
                .when(EffectCondition::OnHit),
            ],
        ),
        AbilityDefinition::single(
            "piercing_thrust",
            AbilityKind::Offensive,
            TriggerCondition::dice_set([("sword", 2), ("fist", 2)]),
            vec![effect(damage(5), EffectTiming::WithDamage)],
        )
        .tagged(AbilityTags::UNBLOCKABLE),
        AbilityDefinition::single(
            "rallying_cry",
            AbilityKind::Offensive,
            TriggerCondition::dice_set([("heart", 2)]),
            vec![effect(
                EffectAction::Choice {
                    options: vec![
                        ChoiceOption {
                            label: "mend".into(),
                            actions: vec![heal_self(3)],
                        },
                        ChoiceOption {
                            label: "focus".into(),
                            actions: vec![EffectAction::GrantToken {
                                token: "taiji".into(),
                                amount: 2,
                                target: Target::SelfPlayer,
                            }],
                        },
                    ],
                },
                EffectTiming::Immediate,
            )],
        ),
        AbilityDefinition::single(
            "feint",
            AbilityKind::Offensive,
            TriggerCondition::dice_set([("heart", 3)]),
            vec![effect(
                EffectAction::Choice {
                    options: vec![
                        ChoiceOption {
                            label: "strike".into(),
                            actions: vec![damage(4)],
                        },
                        ChoiceOption {
                            label: "jab".into(),
                            actions: vec![damage(2), heal_self(2)],
                        },
                    ],
                },
                EffectTiming::WithDamage,
            )],
        ),
        AbilityDefinition::single(
            "gamble",
            AbilityKind::Offensive,
            TriggerCondition::SmallStraight,
            vec![effect(
                EffectAction::RollDie {
                    count: 1,
                    outcomes: vec![
                        RollOutcome {
                            face: Symbol::from("sword"),
                            actions: vec![damage(2)],
                        },
                        RollOutcome {
                            face: Symbol::from("heart"),
                            actions: vec![heal_self(2)],
                        },
                    ],
                },
                EffectTiming::WithDamage,
            )],
        ),
        AbilityDefinition::single(
            "drain_touch",
            AbilityKind::Offensive,
            TriggerCondition::AllSymbolsPresent(vec![
                Symbol::from("sword"),
                Symbol::from("fist"),
                Symbol::from("heart"),
            ]),
            vec![effect(
                EffectAction::Custom {
                    action: DRAIN.into(),
                    params: BTreeMap::from([("amount".to_owned(), 2)]),
                },
                EffectTiming::WithDamage,
            )],
        ),
        AbilityDefinition::single(
            "guard",
            AbilityKind::Defensive,
            TriggerCondition::Phase {
                phase: Phase::DefensiveRoll,
                dice_count: 3,
            },
            vec![effect(
                EffectAction::GrantDamageShield {
                    amount: Amount::PerSymbol {
                        symbol: Symbol::from("sword"),
                        each: 1,
                    },
                    target: Target::SelfPlayer,
                },
                EffectTiming::Immediate,
            )],
        ),
    ];

    HeroDefinition {
        id: KNIGHT.into(),
        name: "Knight".into(),
        dice_faces: ["sword", "sword", "sword", "fist", "fist", "heart"]
            .into_iter()
            .map(Symbol::from)
            .collect(),
        loadout: [
            "sword_strike",
            "crushing_blow",
            "piercing_thrust",
            "rallying_cry",
            "feint",
            "gamble",
            "drain_touch",
            "guard",
        ]
        .into_iter()
        .map(Into::into)
        .collect(),
        abilities,
        cards: vec![
            CardDefinition {
                id: "second_wind".into(),
                name: "Second Wind".into(),
                cp_cost: 1,
                playable_in: vec![Phase::Main1, Phase::Main2],
                copies: 2,
                effects: vec![heal_self(4)],
            },
            CardDefinition {
                id: "sharpen".into(),
                name: "Sharpen".into(),
                cp_cost: 2,
                playable_in: vec![Phase::Main1, Phase::Main2],
                copies: 1,
                effects: vec![EffectAction::ReplaceAbility {
                    from: "sword_strike".into(),
                    to: "sword_strike_ii".into(),
                }],
            },
        ],
    }
}

pub fn tables() -> HeroTables {
    HeroTables::new([knight()], tokens()).expect("fixture definitions are valid")
}

pub fn rules() -> RulesConfig {
    RulesConfig::new()
}

/// Drains `amount` from the opponent into the actor's hit points.
fn drain(ctx: &mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError> {
    let amount = u32::try_from(ctx.require("amount")?).map_err(|_| HandlerError::InvalidParam {
        name: "amount",
        reason: "must not be negative".into(),
    })?;
    Ok(vec![
        CustomDelta::Damage {
            target: Target::Opponent,
            amount,
        },
        CustomDelta::Heal {
            target: Target::SelfPlayer,
            amount,
        },
    ])
}

/// Holds the holder at one hit point against a lethal hit, then spends the blessing.
fn bless(ctx: &mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError> {
    let pending = ctx.pending.ok_or(HandlerError::NoPendingDamage)?;
    let hp = ctx.state.player(ctx.actor).hp;
    let dealt = pending.dealt();
    if dealt < hp {
        return Ok(Vec::new());
    }
    Ok(vec![
        CustomDelta::PreventDamage {
            amount: Some(dealt - hp + 1),
        },
        CustomDelta::RemoveToken {
            target: Target::SelfPlayer,
            token: "blessing".into(),
            amount: None,
        },
    ])
}

pub fn registry() -> CustomActionRegistry {
    let mut registry = CustomActionRegistry::new();
    registry
        .register(
            DRAIN,
            ActionMetadata::new(
                ActionCategories::DAMAGE | ActionCategories::HEAL,
                "damage the opponent and heal by the same amount",
            ),
            drain,
        )
        .expect("fresh registry");
    registry
        .register(
            BLESS,
            ActionMetadata::new(
                ActionCategories::PREVENTION | ActionCategories::TOKENS,
                "prevent a lethal hit down to one hit point",
            ),
            bless,
        )
        .expect("fresh registry");
    registry
}

/// Two knights with full loadouts and unshuffled decks, first player in upkeep.
pub fn match_state() -> MatchState {
    let tables = tables();
    let rules = rules();
    let hero = tables
        .hero(&HeroId::from(KNIGHT))
        .expect("knight is in the fixture tables");

    let seat = |id: PlayerId| {
        let mut player =
            PlayerState::new(id, hero.id.clone(), rules.starting_hp, rules.starting_cp);
        player.abilities = hero.loadout.clone();
        player.deck = hero.deck_list();
        player
    };
    MatchState::new(0, [seat(PlayerId::FIRST), seat(PlayerId::SECOND)])
}

pub fn env<'a>(
    tables: &'a HeroTables,
    rules: &'a RulesConfig,
    registry: &'a CustomActionRegistry,
) -> GameEnv<'a> {
    GameEnv::from_parts(tables, rules, registry)
}
