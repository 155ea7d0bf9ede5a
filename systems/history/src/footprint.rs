//! Shared purchase and refund steps for structures that occupy tiles.

use zoo_tycoon_core::{CellRect, CommandError, GridError, Money};
use zoo_tycoon_world::{query, FootprintClaim, World};

/// Validates, pays for and claims `region`.
///
/// Bounds and overlap are checked before funds, and nothing is mutated unless
/// every check passes.
pub(crate) fn purchase(
    world: &mut World,
    region: CellRect,
    cost: Money,
) -> Result<FootprintClaim, CommandError> {
    world.check_footprint(&region)?;

    let available = query::balance(world);
    if !world.treasury_mut().spend(cost) {
        return Err(CommandError::InsufficientFunds {
            required: cost,
            available,
        });
    }

    match world.claim_footprint(region) {
        Ok(claim) => Ok(claim),
        Err(error) => {
            world.treasury_mut().add(cost);
            Err(error)
        }
    }
}

/// Gives the tiles of `claim` back and credits `cost` to the treasury.
pub(crate) fn refund(world: &mut World, claim: &FootprintClaim, cost: Money) -> Result<(), GridError> {
    world.release_footprint(claim)?;
    world.treasury_mut().add(cost);
    Ok(())
}
