//! Match setup: seats, shuffled decks, starting hands and the first upkeep.

use crate::env::{GameEnv, OracleError, PcgRandom, compute_seed, shuffle};
use crate::event::DomainEvent;
use crate::resolve::{ResolveCtx, ResolveError, draw_cards};
use crate::state::{HeroId, MatchState, Phase, PlayerId, PlayerState};

use super::turns::enter_phase;

/// Random stream context used for the opening draws.
const OPENING_DRAW_CONTEXT: u32 = 3;

/// Builds the opening state for `heroes` (first seat first) and runs the
/// first player's automatic phases.
///
/// Deck shuffles and opening draws use streams derived from `seed` at
/// nonce 0, so the same seed always produces the same opening.
pub fn setup_match(
    env: GameEnv<'_>,
    heroes: [HeroId; 2],
    seed: u64,
) -> Result<(MatchState, Vec<DomainEvent>), ResolveError> {
    let [first, second] = heroes;
    let players = [
        seat(env, PlayerId::FIRST, first, seed)?,
        seat(env, PlayerId::SECOND, second, seed)?,
    ];
    let mut state = MatchState::new(seed, players);

    let mut rng = PcgRandom::new(compute_seed(seed, 0, OPENING_DRAW_CONTEXT));
    let mut events = Vec::new();
    {
        let mut ctx = ResolveCtx::new(&mut state, env, &mut rng, &mut events);
        let hand = ctx.rules()?.starting_hand;
        for player in PlayerId::all() {
            draw_cards(&mut ctx, player, hand)?;
        }
        enter_phase(&mut ctx, Phase::Upkeep)?;
    }

    tracing::info!(
        seed,
        first = %state.player(PlayerId::FIRST).hero,
        second = %state.player(PlayerId::SECOND).hero,
        "match set up"
    );
    Ok((state, events))
}

fn seat(
    env: GameEnv<'_>,
    player: PlayerId,
    hero_id: HeroId,
    seed: u64,
) -> Result<PlayerState, ResolveError> {
    let rules = env.config()?.rules();
    let hero = env
        .heroes()?
        .hero(&hero_id)
        .ok_or_else(|| OracleError::HeroNotFound(hero_id.clone()))?;

    let mut state = PlayerState::new(player, hero_id, rules.starting_hp, rules.starting_cp);
    state.abilities = hero.loadout.clone();
    state.deck = hero.deck_list();

    let mut rng = PcgRandom::new(compute_seed(seed, 0, 1 + u32::from(player.0)));
    shuffle(&mut rng, &mut state.deck);
    tracing::debug!(%player, hero = %hero.id, deck = state.deck.len(), "seat prepared");
    Ok(state)
}
