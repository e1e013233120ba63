use crate::ability::{AbilityDefinition, AbilityKind};
use crate::dice::{AbilityMatch, TriggerContext, select_variant};
use crate::engine::command::SelectAbility;
use crate::engine::errors::CommandError;
use crate::engine::transition::{CommandTransition, hero_of};
use crate::engine::turns::leave_offensive_roll;
use crate::env::GameEnv;
use crate::resolve::{ResolveCtx, ResolveError, start_attack};
use crate::state::{MatchState, Phase, PlayerId};

use super::{awaiting_defense, require_no_attack, require_phase};

impl SelectAbility {
    fn owned<'e>(
        &self,
        player: PlayerId,
        state: &MatchState,
        env: &GameEnv<'e>,
        kind: AbilityKind,
    ) -> Result<&'e AbilityDefinition, CommandError> {
        if !state.player(player).has_ability(&self.ability) {
            return Err(CommandError::AbilityNotOwned(self.ability.clone()));
        }
        let hero = hero_of(state, env, player)?;
        let ability = hero
            .ability(&self.ability)
            .ok_or_else(|| CommandError::AbilityNotOwned(self.ability.clone()))?;
        if ability.kind != kind {
            return Err(CommandError::WrongAbilityKind(self.ability.clone()));
        }
        Ok(ability)
    }

    /// Variant the current offensive tray activates.
    fn offensive_match(
        &self,
        ability: &AbilityDefinition,
        state: &MatchState,
    ) -> Result<AbilityMatch, CommandError> {
        let ctx = TriggerContext::new(state.turn.tray.dice(), Phase::OffensiveRoll);
        select_variant(ability, &ctx)
            .map_err(ResolveError::from)?
            .ok_or_else(|| CommandError::TriggerNotSatisfied(self.ability.clone()))
    }
}

impl CommandTransition for SelectAbility {
    fn pre_validate(
        &self,
        player: PlayerId,
        state: &MatchState,
        env: &GameEnv<'_>,
    ) -> Result<(), CommandError> {
        if awaiting_defense(state, player) {
            self.owned(player, state, env, AbilityKind::Defensive)?;
            return Ok(());
        }

        require_no_attack(state)?;
        require_phase(state, &[Phase::OffensiveRoll])?;
        if !state.turn.tray.has_rolled() {
            return Err(CommandError::NotRolled);
        }
        let ability = self.owned(player, state, env, AbilityKind::Offensive)?;
        self.offensive_match(ability, state)?;
        Ok(())
    }

    fn apply(&self, player: PlayerId, ctx: &mut ResolveCtx<'_, '_>) -> Result<(), CommandError> {
        if awaiting_defense(ctx.state, player) {
            if let Some(attack) = ctx.state.attack.as_mut() {
                attack.defense_choice = Some(self.ability.clone());
            }
            tracing::debug!(defender = %player, ability = %self.ability, "defense chosen");
            return Ok(());
        }

        let ability = self.owned(player, ctx.state, &ctx.env, AbilityKind::Offensive)?;
        let matched = self.offensive_match(ability, ctx.state)?;
        let dice = ctx.state.turn.tray.dice().to_vec();

        leave_offensive_roll(ctx)?;
        if ctx.state.is_over() {
            return Ok(());
        }
        start_attack(ctx, player, &matched, dice)?;
        Ok(())
    }
}
