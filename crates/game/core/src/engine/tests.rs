use super::*;
use crate::config::RulesConfig;
use crate::env::{HeroOracle, HeroTables, QueuedRandom};
use crate::error::{ErrorSeverity, GameError};
use crate::registry::CustomActionRegistry;
use crate::resolve::{ResolveCtx, ResolveError, grant_token};
use crate::state::{AbilityId, CardId, CustomActionId, Phase, TokenId};
use crate::testing::fixtures;
use crate::token::PassiveTiming;

const FIRST: PlayerId = PlayerId::FIRST;
const SECOND: PlayerId = PlayerId::SECOND;

struct Table {
    tables: HeroTables,
    rules: RulesConfig,
    registry: CustomActionRegistry,
}

impl Table {
    fn new() -> Self {
        Self {
            tables: fixtures::tables(),
            rules: fixtures::rules(),
            registry: fixtures::registry(),
        }
    }

    fn without_custom_actions() -> Self {
        Self {
            registry: CustomActionRegistry::new(),
            ..Self::new()
        }
    }

    fn env(&self) -> GameEnv<'_> {
        fixtures::env(&self.tables, &self.rules, &self.registry)
    }
}

fn exec(
    state: &mut MatchState,
    env: GameEnv<'_>,
    rng: &mut QueuedRandom,
    player: PlayerId,
    kind: impl Into<CommandKind>,
) -> Result<ExecutionOutcome, ExecuteError> {
    GameEngine::new(state).execute(env, rng, &Command::new(player, kind))
}

/// A fresh match with the first player at the start of its offensive roll.
fn ready_to_roll(env: GameEnv<'_>, rng: &mut QueuedRandom) -> MatchState {
    let mut state = fixtures::match_state();
    state.turn.phase = Phase::Main1;
    exec(&mut state, env, rng, FIRST, AdvancePhase).unwrap();
    assert_eq!(state.turn.phase, Phase::OffensiveRoll);
    state
}

/// Rolls `faces` for the first player and activates `ability`.
fn attack_with(
    state: &mut MatchState,
    env: GameEnv<'_>,
    rng: &mut QueuedRandom,
    faces: [u32; 5],
    ability: &str,
) -> ExecutionOutcome {
    for face in faces {
        rng.push(face);
    }
    exec(state, env, rng, FIRST, RollDice).unwrap();
    exec(
        state,
        env,
        rng,
        FIRST,
        SelectAbility {
            ability: ability.into(),
        },
    )
    .unwrap()
}

/// The second player rolls "guard" with `faces` queued ahead of anything else.
fn defend(
    state: &mut MatchState,
    env: GameEnv<'_>,
    rng: &mut QueuedRandom,
    faces: &[u32],
) -> Result<ExecutionOutcome, ExecuteError> {
    for &face in faces {
        rng.push(face);
    }
    exec(state, env, rng, SECOND, RollDice)
}

fn grant(state: &mut MatchState, table: &Table, player: PlayerId, token: &str, stacks: u8) {
    let definition = table.tables.token(&TokenId::from(token)).unwrap();
    state.player_mut(player).tokens.grant(definition, stacks);
}

// ===== attacks =====

#[test]
fn plain_hit_deals_base_damage() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);

    let outcome = attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    assert_eq!(outcome.next_actor, SECOND);
    assert_eq!(state.turn.phase, Phase::DefensiveRoll);

    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 4);
    assert_eq!(state.player(FIRST).hp, table.rules.starting_hp);
    assert!(state.player(FIRST).tokens.is_empty());
    assert!(state.player(SECOND).tokens.is_empty());
    assert!(state.attack.is_none());
    assert_eq!(state.turn.phase, Phase::Main2);
    assert!(outcome.events.contains(&DomainEvent::DamageDealt {
        target: SECOND,
        original: 4,
        final_amount: 4,
        direct: false,
    }));
    assert!(outcome.events.contains(&DomainEvent::AttackResolved {
        attacker: FIRST,
        defender: SECOND,
        ability: AbilityId::from("sword_strike"),
        damage: 4,
        evaded: false,
    }));
}

#[test]
fn unblockable_attack_skips_defense_and_mitigation() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, SECOND, "taiji", 2);

    let outcome = attack_with(&mut state, env, &mut rng, [1, 1, 4, 4, 6], "piercing_thrust");

    assert_eq!(outcome.interaction, None);
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 5);
    assert_eq!(state.player(SECOND).tokens.stacks(&TokenId::from("taiji")), 2);
    assert_eq!(state.turn.phase, Phase::Main2);
    assert!(!outcome.events.iter().any(|event| matches!(
        event,
        DomainEvent::DiceRolled {
            purpose: crate::event::RollPurpose::Defensive,
            ..
        }
    )));
}

#[test]
fn defensive_shield_absorbs_and_expires() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    // Two swords on the defense: shield 2.
    defend(&mut state, env, &mut rng, &[1, 2, 4]).unwrap();

    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 2);
    assert_eq!(state.player(SECOND).shield, 0);
}

#[test]
fn mitigation_window_spends_tokens_then_closes() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, SECOND, "taiji", 2);

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::DefenderMitigation));
    assert_eq!(outcome.next_actor, SECOND);

    let taiji = TokenId::from("taiji");
    let spend = UseToken {
        token: taiji.clone(),
    };
    let outcome = exec(&mut state, env, &mut rng, SECOND, spend.clone()).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::DefenderMitigation));

    let outcome = exec(&mut state, env, &mut rng, SECOND, spend).unwrap();
    assert_eq!(outcome.interaction, None);
    assert_eq!(state.player(SECOND).tokens.stacks(&taiji), 0);
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 2);
}

#[test]
fn only_the_window_owner_may_act() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, SECOND, "taiji", 1);
    grant(&mut state, &table, FIRST, "taiji", 1);

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    // The attacker boosts first.
    assert_eq!(outcome.interaction, Some(InteractionKind::AttackerBoost));
    assert_eq!(outcome.next_actor, FIRST);

    let before = state.clone();
    let err = exec(
        &mut state,
        env,
        &mut rng,
        SECOND,
        UseToken {
            token: "taiji".into(),
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::NotInteractionOwner {
            owner: FIRST,
            kind: InteractionKind::AttackerBoost,
            ..
        }
    ));

    let err = exec(&mut state, env, &mut rng, FIRST, AdvancePhase).unwrap_err();
    assert!(matches!(err, ExecuteError::InteractionPending { .. }));
    assert_eq!(state, before);

    let outcome = exec(&mut state, env, &mut rng, FIRST, SkipWindow).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::DefenderMitigation));
    assert_eq!(outcome.next_actor, SECOND);
}

#[test]
fn attacker_spends_tokens_to_raise_the_hit() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, FIRST, "taiji", 2);

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::AttackerBoost));

    let taiji = TokenId::from("taiji");
    let spend = UseToken {
        token: taiji.clone(),
    };
    let outcome = exec(&mut state, env, &mut rng, FIRST, spend.clone()).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::AttackerBoost));
    assert_eq!(outcome.next_actor, FIRST);

    // Nothing left to spend and the defender holds nothing: the hit lands.
    let outcome = exec(&mut state, env, &mut rng, FIRST, spend).unwrap();
    assert_eq!(outcome.interaction, None);
    assert_eq!(state.player(FIRST).tokens.stacks(&taiji), 0);
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 6);
    assert!(outcome.events.contains(&DomainEvent::DamageDealt {
        target: SECOND,
        original: 4,
        final_amount: 6,
        direct: false,
    }));
}

#[test]
fn status_modifiers_scale_both_sides_of_the_hit() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    // Outgoing +1 per stack on the attacker, incoming +2 on the defender.
    grant(&mut state, &table, FIRST, "fury", 2);
    grant(&mut state, &table, SECOND, "targeted", 1);

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();

    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 8);
    assert!(outcome.events.contains(&DomainEvent::DamageDealt {
        target: SECOND,
        original: 4,
        final_amount: 8,
        direct: false,
    }));
    // Modifiers are persistent statuses, not spent by the hit.
    assert_eq!(state.player(FIRST).tokens.stacks(&TokenId::from("fury")), 2);
    assert_eq!(state.player(SECOND).tokens.stacks(&TokenId::from("targeted")), 1);
}

#[test]
fn evaded_attack_does_not_trigger_on_hit() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, SECOND, "evasive", 1);

    attack_with(&mut state, env, &mut rng, [4, 4, 5, 1, 6], "crushing_blow");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::DefenderMitigation));

    rng.push(1);
    let outcome = exec(
        &mut state,
        env,
        &mut rng,
        SECOND,
        UseToken {
            token: "evasive".into(),
        },
    )
    .unwrap();

    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp);
    assert_eq!(state.player(SECOND).tokens.stacks(&TokenId::from("knockdown")), 0);
    assert!(outcome.events.contains(&DomainEvent::AttackResolved {
        attacker: FIRST,
        defender: SECOND,
        ability: AbilityId::from("crushing_blow"),
        damage: 0,
        evaded: true,
    }));
}

#[test]
fn failed_negate_roll_lets_the_hit_land() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, SECOND, "evasive", 1);

    attack_with(&mut state, env, &mut rng, [4, 4, 5, 1, 6], "crushing_blow");
    defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    rng.push(5);
    exec(
        &mut state,
        env,
        &mut rng,
        SECOND,
        UseToken {
            token: "evasive".into(),
        },
    )
    .unwrap();

    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 3);
    assert_eq!(state.player(SECOND).tokens.stacks(&TokenId::from("knockdown")), 1);
}

#[test]
fn knockdown_skips_the_victims_next_offensive_roll() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);

    attack_with(&mut state, env, &mut rng, [4, 4, 5, 1, 6], "crushing_blow");
    defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    let knockdown = TokenId::from("knockdown");
    assert_eq!(state.player(SECOND).tokens.stacks(&knockdown), 1);

    let outcome = exec(&mut state, env, &mut rng, FIRST, AdvancePhase).unwrap();
    assert_eq!(outcome.next_actor, SECOND);
    assert_eq!(state.turn.phase, Phase::Main1);

    let outcome = exec(&mut state, env, &mut rng, SECOND, AdvancePhase).unwrap();
    assert_eq!(state.turn.active, SECOND);
    assert_eq!(state.turn.phase, Phase::Main2);
    assert_eq!(state.player(SECOND).tokens.stacks(&knockdown), 0);
    assert!(outcome.events.contains(&DomainEvent::PhaseSkipped {
        player: SECOND,
        phase: Phase::OffensiveRoll,
    }));
}

#[test]
fn lethal_hit_ends_the_match() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    state.player_mut(SECOND).hp = 3;

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    assert_eq!(outcome.winner, Some(FIRST));
    assert!(outcome
        .events
        .contains(&DomainEvent::PlayerDefeated { player: SECOND }));

    let err = exec(&mut state, env, &mut rng, FIRST, AdvancePhase).unwrap_err();
    assert!(matches!(err, ExecuteError::MatchOver { .. }));
}

#[test]
fn blessing_prevents_a_lethal_hit_once() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    state.player_mut(SECOND).hp = 3;
    grant(&mut state, &table, SECOND, "blessing", 1);

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();

    assert_eq!(outcome.winner, None);
    assert_eq!(state.player(SECOND).hp, 1);
    assert_eq!(state.player(SECOND).tokens.stacks(&TokenId::from("blessing")), 0);
    assert!(outcome.events.contains(&DomainEvent::DamagePrevented {
        target: SECOND,
        amount: 2,
    }));
    assert!(outcome.events.contains(&DomainEvent::AttackResolved {
        attacker: FIRST,
        defender: SECOND,
        ability: AbilityId::from("sword_strike"),
        damage: 2,
        evaded: false,
    }));
    assert_eq!(state.turn.phase, Phase::Main2);
}

#[test]
fn blessing_stays_put_when_the_hit_is_survivable() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, SECOND, "blessing", 1);

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();

    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 4);
    assert_eq!(state.player(SECOND).tokens.stacks(&TokenId::from("blessing")), 1);
    assert!(!outcome.events.iter().any(|event| matches!(
        event,
        DomainEvent::DamagePrevented { .. }
    )));
}

#[test]
fn extra_attack_returns_to_the_offensive_roll() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, FIRST, "frenzy", 1);

    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();

    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 4);
    assert!(outcome.events.contains(&DomainEvent::PassiveTriggered {
        player: FIRST,
        token: TokenId::from("frenzy"),
        timing: PassiveTiming::OnAttackEnd,
    }));
    assert_eq!(outcome.next_actor, FIRST);
    assert_eq!(state.turn.active, FIRST);
    assert_eq!(state.turn.phase, Phase::OffensiveRoll);
    assert_eq!(state.turn.extra_attacks, 0);
    assert!(!state.turn.tray.has_rolled());
    assert_eq!(state.turn.tray.rolls_left, table.rules.offensive_roll_attempts);
    assert_eq!(state.player(FIRST).tokens.stacks(&TokenId::from("frenzy")), 0);

    // The second attack ends the sequence.
    attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");
    defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 8);
    assert_eq!(state.turn.phase, Phase::Main2);
}

#[test]
fn leaving_the_offensive_roll_fires_its_passives() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, FIRST, "momentum", 2);
    let cp = state.player(FIRST).cp;

    let outcome = attack_with(&mut state, env, &mut rng, [1, 1, 1, 4, 6], "sword_strike");

    assert_eq!(state.player(FIRST).cp, cp + 2);
    assert_eq!(state.player(FIRST).tokens.stacks(&TokenId::from("momentum")), 0);
    assert!(outcome.events.contains(&DomainEvent::PassiveTriggered {
        player: FIRST,
        token: TokenId::from("momentum"),
        timing: PassiveTiming::OnOffensiveRollEnd,
    }));
    assert!(outcome.events.contains(&DomainEvent::CpChanged {
        player: FIRST,
        before: cp,
        after: cp + 2,
    }));
    assert_eq!(state.turn.phase, Phase::DefensiveRoll);
}

// ===== interactions raised by effects =====

#[test]
fn choice_waits_for_its_owner() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);

    attack_with(&mut state, env, &mut rng, [6, 6, 1, 4, 5], "rallying_cry");
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::Choice));
    assert_eq!(outcome.next_actor, FIRST);

    let err = exec(&mut state, env, &mut rng, FIRST, SkipWindow).unwrap_err();
    assert_eq!(err.command_error(), Some(&CommandError::CannotSkipChoice));
    let err = exec(&mut state, env, &mut rng, FIRST, ResolveChoice { option: 5 }).unwrap_err();
    assert_eq!(
        err.command_error(),
        Some(&CommandError::OptionOutOfRange { option: 5 })
    );

    let outcome = exec(&mut state, env, &mut rng, FIRST, ResolveChoice { option: 1 }).unwrap();
    assert_eq!(outcome.interaction, None);
    assert!(outcome.events.contains(&DomainEvent::ChoiceResolved {
        player: FIRST,
        option: 1,
    }));
    assert_eq!(state.player(FIRST).tokens.stacks(&TokenId::from("taiji")), 2);
    assert!(state.attack.is_none());
    assert_eq!(state.turn.phase, Phase::Main2);
}

#[test]
fn damage_choice_feeds_the_attack_before_the_shield() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);

    attack_with(&mut state, env, &mut rng, [6, 6, 6, 1, 4], "feint");
    // Two swords on the defense: shield 2.
    let outcome = defend(&mut state, env, &mut rng, &[1, 2, 4]).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::Choice));
    assert_eq!(outcome.next_actor, FIRST);
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp);

    let outcome = exec(&mut state, env, &mut rng, FIRST, ResolveChoice { option: 0 }).unwrap();
    assert_eq!(outcome.interaction, None);
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 2);
    assert!(outcome.events.contains(&DomainEvent::DamageDealt {
        target: SECOND,
        original: 4,
        final_amount: 2,
        direct: false,
    }));
    assert!(!outcome.events.iter().any(|event| matches!(
        event,
        DomainEvent::DamageDealt { direct: true, .. }
    )));
    assert!(outcome.events.contains(&DomainEvent::AttackResolved {
        attacker: FIRST,
        defender: SECOND,
        ability: AbilityId::from("feint"),
        damage: 2,
        evaded: false,
    }));
    assert_eq!(state.turn.phase, Phase::Main2);
}

#[test]
fn bonus_die_can_be_rerolled_with_a_token() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, FIRST, "lucky", 1);
    state.player_mut(FIRST).hp = 40;

    attack_with(&mut state, env, &mut rng, [1, 2, 3, 4, 6], "gamble");
    // Defense dice, then a heart on the bonus die.
    let outcome = defend(&mut state, env, &mut rng, &[4, 5, 6, 6]).unwrap();
    assert_eq!(outcome.interaction, Some(InteractionKind::BonusDiceReroll));
    assert_eq!(outcome.next_actor, FIRST);

    rng.push(1);
    let outcome = exec(
        &mut state,
        env,
        &mut rng,
        FIRST,
        RerollBonusDie {
            index: 0,
            token: "lucky".into(),
        },
    )
    .unwrap();

    assert_eq!(outcome.interaction, None);
    assert_eq!(state.player(FIRST).tokens.stacks(&TokenId::from("lucky")), 0);
    assert_eq!(state.player(FIRST).hp, 40);
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 2);
}

#[test]
fn skipping_the_reroll_keeps_the_bonus_die() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    grant(&mut state, &table, FIRST, "lucky", 1);
    state.player_mut(FIRST).hp = 40;

    attack_with(&mut state, env, &mut rng, [1, 2, 3, 4, 6], "gamble");
    defend(&mut state, env, &mut rng, &[4, 5, 6, 6]).unwrap();
    exec(&mut state, env, &mut rng, FIRST, SkipWindow).unwrap();

    assert_eq!(state.player(FIRST).tokens.stacks(&TokenId::from("lucky")), 1);
    assert_eq!(state.player(FIRST).hp, 42);
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp);
}

#[test]
fn custom_action_contributes_damage_and_heals() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    state.player_mut(FIRST).hp = 40;

    attack_with(&mut state, env, &mut rng, [1, 4, 6, 2, 5], "drain_touch");
    defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap();

    assert_eq!(state.player(FIRST).hp, 42);
    assert_eq!(state.player(SECOND).hp, table.rules.starting_hp - 2);
}

#[test]
fn unknown_custom_action_is_fatal_and_rolls_back() {
    let table = Table::without_custom_actions();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);

    attack_with(&mut state, env, &mut rng, [1, 4, 6, 2, 5], "drain_touch");
    let before = state.clone();
    let err = defend(&mut state, env, &mut rng, &[4, 5, 6]).unwrap_err();

    assert_eq!(
        err.command_error(),
        Some(&CommandError::Resolve(ResolveError::UnknownCustomAction(
            CustomActionId::from(fixtures::DRAIN)
        )))
    );
    assert_eq!(err.severity(), ErrorSeverity::Fatal);
    assert_eq!(state, before);
}

// ===== dice, cards and removal =====

#[test]
fn locked_dice_survive_a_reroll() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([1, 1, 1, 4, 6]);
    let mut state = ready_to_roll(env, &mut rng);

    exec(&mut state, env, &mut rng, FIRST, RollDice).unwrap();
    for index in 0..3 {
        exec(&mut state, env, &mut rng, FIRST, ToggleDieLock { index }).unwrap();
    }
    rng.push(2);
    rng.push(3);
    exec(&mut state, env, &mut rng, FIRST, RollDice).unwrap();

    let values: Vec<u8> = state.turn.tray.dice().iter().map(|die| die.value).collect();
    assert_eq!(values, vec![1, 1, 1, 2, 3]);
    assert_eq!(
        state.turn.tray.rolls_left,
        table.rules.offensive_roll_attempts - 2
    );

    let err = exec(&mut state, env, &mut rng, FIRST, ToggleDieLock { index: 7 }).unwrap_err();
    assert_eq!(
        err.command_error(),
        Some(&CommandError::DieOutOfRange { index: 7 })
    );
}

#[test]
fn rejected_commands_leave_state_untouched() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    let before = state.clone();

    let err = exec(
        &mut state,
        env,
        &mut rng,
        FIRST,
        SelectAbility {
            ability: "sword_strike".into(),
        },
    )
    .unwrap_err();
    assert_eq!(err.command_error(), Some(&CommandError::NotRolled));
    assert_eq!(err.severity(), ErrorSeverity::Validation);

    let err = exec(&mut state, env, &mut rng, SECOND, RollDice).unwrap_err();
    assert!(matches!(err, ExecuteError::NotYourTurn { expected: FIRST, .. }));

    let err = exec(&mut state, env, &mut rng, FIRST, SkipWindow).unwrap_err();
    assert!(matches!(err, ExecuteError::NoInteraction { .. }));

    rng.push(1);
    rng.push(1);
    rng.push(1);
    rng.push(4);
    rng.push(6);
    exec(&mut state, env, &mut rng, FIRST, RollDice).unwrap();
    let rolled = state.clone();
    let err = exec(
        &mut state,
        env,
        &mut rng,
        FIRST,
        SelectAbility {
            ability: "crushing_blow".into(),
        },
    )
    .unwrap_err();
    assert_eq!(
        err.command_error(),
        Some(&CommandError::TriggerNotSatisfied(AbilityId::from(
            "crushing_blow"
        )))
    );
    assert_eq!(state, rolled);
    assert_ne!(state, before);
    assert_eq!(state.nonce, before.nonce + 1);
}

#[test]
fn cards_cost_cp_and_upgrade_abilities() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = fixtures::match_state();
    state.turn.phase = Phase::Main1;
    state.player_mut(FIRST).hand = vec![CardId::from("sharpen"), CardId::from("second_wind")];

    let outcome = exec(
        &mut state,
        env,
        &mut rng,
        FIRST,
        PlayCard {
            card: "sharpen".into(),
        },
    )
    .unwrap();

    let seat = state.player(FIRST);
    assert_eq!(seat.cp, table.rules.starting_cp - 2);
    assert!(seat.has_ability(&AbilityId::from("sword_strike_ii")));
    assert!(!seat.has_ability(&AbilityId::from("sword_strike")));
    assert_eq!(seat.ability_level(&AbilityId::from("sword_strike_ii")), 2);
    assert_eq!(seat.discard, vec![CardId::from("sharpen")]);
    assert!(outcome.events.contains(&DomainEvent::CardPlayed {
        player: FIRST,
        card: CardId::from("sharpen"),
    }));

    let err = exec(
        &mut state,
        env,
        &mut rng,
        FIRST,
        PlayCard {
            card: "second_wind".into(),
        },
    )
    .unwrap_err();
    assert_eq!(
        err.command_error(),
        Some(&CommandError::InsufficientCp { have: 0, need: 1 })
    );
}

#[test]
fn cards_respect_their_phases() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = ready_to_roll(env, &mut rng);
    state.player_mut(FIRST).hand = vec![CardId::from("second_wind")];

    let err = exec(
        &mut state,
        env,
        &mut rng,
        FIRST,
        PlayCard {
            card: "second_wind".into(),
        },
    )
    .unwrap_err();
    assert_eq!(
        err.command_error(),
        Some(&CommandError::CardNotPlayable {
            card: CardId::from("second_wind"),
            phase: Phase::OffensiveRoll,
        })
    );
}

#[test]
fn removal_cost_clears_a_persistent_debuff() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let mut state = fixtures::match_state();
    state.turn.phase = Phase::Main1;
    grant(&mut state, &table, FIRST, "burn", 2);
    grant(&mut state, &table, FIRST, "knockdown", 1);

    let outcome = exec(
        &mut state,
        env,
        &mut rng,
        FIRST,
        PayRemovalCost {
            token: "burn".into(),
        },
    )
    .unwrap();
    assert_eq!(state.player(FIRST).cp, table.rules.starting_cp - 2);
    assert_eq!(state.player(FIRST).tokens.stacks(&TokenId::from("burn")), 0);
    assert!(outcome.events.contains(&DomainEvent::TokenRemoved {
        player: FIRST,
        token: TokenId::from("burn"),
        stacks: 2,
    }));

    let err = exec(
        &mut state,
        env,
        &mut rng,
        FIRST,
        PayRemovalCost {
            token: "knockdown".into(),
        },
    )
    .unwrap_err();
    assert_eq!(
        err.command_error(),
        Some(&CommandError::NotRemovable(TokenId::from("knockdown")))
    );
}

#[test]
fn single_stack_consumable_clamps_at_its_limit() {
    let table = Table::new();
    let mut state = fixtures::match_state();
    let mut rng = QueuedRandom::new([]);
    let mut events = Vec::new();
    let resolve = TokenId::from("resolve");

    let mut ctx = ResolveCtx::new(&mut state, table.env(), &mut rng, &mut events);
    grant_token(&mut ctx, FIRST, &resolve, 1).unwrap();
    grant_token(&mut ctx, FIRST, &resolve, 1).unwrap();

    assert_eq!(state.player(FIRST).tokens.stacks(&resolve), 1);
    assert_eq!(events.len(), 1);
}

#[test]
fn reduce_does_not_touch_its_input() {
    let table = Table::new();
    let env = table.env();
    let mut rng = QueuedRandom::new([]);
    let state = ready_to_roll(env, &mut rng);

    let mut rng = QueuedRandom::new([1, 1, 1, 4, 6]);
    let (next, events) = reduce(&state, env, &mut rng, &Command::new(FIRST, RollDice)).unwrap();

    assert!(!state.turn.tray.has_rolled());
    assert!(next.turn.tray.has_rolled());
    assert_eq!(next.nonce, state.nonce + 1);
    assert_eq!(events.len(), 1);
}
