//! Custom action handlers for the built-in heroes.
//!
//! Every id referenced by the bundled hero and token data must be registered
//! here; [`crate::audit`] checks both directions.

use duel_core::ability::Target;
use duel_core::dice::count_symbol;
use duel_core::registry::{
    ActionCategories, ActionMetadata, CustomActionContext, CustomActionRegistry, CustomDelta,
    HandlerError, RegistryError,
};
use duel_core::state::{Symbol, TokenId};

pub const MONK_MEDITATION: &str = "monk.meditation";
pub const BARBARIAN_RECKLESS: &str = "barbarian.reckless";
pub const BARBARIAN_COOL_DOWN: &str = "barbarian.cool_down";

/// Registers every built-in handler.
pub fn register_builtin(registry: &mut CustomActionRegistry) -> Result<(), RegistryError> {
    registry.register(
        MONK_MEDITATION,
        ActionMetadata::new(
            ActionCategories::TOKENS | ActionCategories::DAMAGE | ActionCategories::DEFENSE,
            "taiji per taiji face rolled, counter damage per fist face",
        ),
        meditation,
    )?;
    registry.register(
        BARBARIAN_RECKLESS,
        ActionMetadata::new(
            ActionCategories::DAMAGE,
            "heavy damage to the opponent plus recoil to the attacker",
        ),
        reckless,
    )?;
    registry.register(
        BARBARIAN_COOL_DOWN,
        ActionMetadata::new(ActionCategories::TOKENS, "drop one stack of enraged"),
        cool_down,
    )?;
    Ok(())
}

/// A fresh registry holding the built-in handlers.
pub fn builtin_registry() -> Result<CustomActionRegistry, RegistryError> {
    let mut registry = CustomActionRegistry::new();
    register_builtin(&mut registry)?;
    Ok(registry)
}

fn non_negative(name: &'static str, value: i32) -> Result<u32, HandlerError> {
    u32::try_from(value).map_err(|_| HandlerError::InvalidParam {
        name,
        reason: format!("must not be negative, got {value}"),
    })
}

fn meditation(ctx: &mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError> {
    let per_fist = non_negative("per_fist", ctx.param_or("per_fist", 1))?;
    let taiji = count_symbol(ctx.dice, &Symbol::from("taiji"));
    let fists = count_symbol(ctx.dice, &Symbol::from("fist"));

    let mut deltas = Vec::new();
    if taiji > 0 {
        deltas.push(CustomDelta::GrantToken {
            target: Target::SelfPlayer,
            token: TokenId::from("taiji"),
            amount: u8::try_from(taiji).unwrap_or(u8::MAX),
        });
    }
    if fists > 0 && per_fist > 0 {
        deltas.push(CustomDelta::Damage {
            target: Target::Opponent,
            amount: fists * per_fist,
        });
    }
    Ok(deltas)
}

fn reckless(ctx: &mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError> {
    let amount = non_negative("amount", ctx.require("amount")?)?;
    let recoil = non_negative("recoil", ctx.param_or("recoil", 0))?;

    let mut deltas = vec![CustomDelta::Damage {
        target: Target::Opponent,
        amount,
    }];
    if recoil > 0 {
        deltas.push(CustomDelta::Damage {
            target: Target::SelfPlayer,
            amount: recoil,
        });
    }
    Ok(deltas)
}

fn cool_down(_: &mut CustomActionContext<'_>) -> Result<Vec<CustomDelta>, HandlerError> {
    Ok(vec![CustomDelta::RemoveToken {
        target: Target::SelfPlayer,
        token: TokenId::from("enraged"),
        amount: Some(1),
    }])
}
