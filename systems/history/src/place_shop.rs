use log::warn;
use zoo_tycoon_core::{CellCoord, CellRect, CommandError, ShopBlueprint, ShopId};
use zoo_tycoon_world::{FootprintClaim, Shop, World};

use crate::{footprint, Command};

/// Places a shop with its top-left corner at `origin`.
#[derive(Debug)]
pub struct PlaceShopCommand {
    blueprint: ShopBlueprint,
    origin: CellCoord,
    shop: Option<ShopId>,
    claim: Option<FootprintClaim>,
}

impl PlaceShopCommand {
    /// Creates a command that has not been executed yet.
    #[must_use]
    pub fn new(blueprint: ShopBlueprint, origin: CellCoord) -> Self {
        Self {
            blueprint,
            origin,
            shop: None,
            claim: None,
        }
    }

    /// Identifier allocated on first execution.
    #[must_use]
    pub const fn shop(&self) -> Option<ShopId> {
        self.shop
    }
}

impl Command for PlaceShopCommand {
    fn execute(&mut self, world: &mut World) -> Result<(), CommandError> {
        let region = CellRect::from_origin_and_size(self.origin, self.blueprint.size);
        let claim = footprint::purchase(world, region, self.blueprint.cost)?;

        let id = *self.shop.get_or_insert_with(|| world.allocate_shop_id());
        world.insert_shop(Shop::new(id, &self.blueprint.name, region));
        self.claim = Some(claim);
        Ok(())
    }

    fn undo(&mut self, world: &mut World) -> Result<(), CommandError> {
        let (Some(id), Some(claim)) = (self.shop, self.claim.take()) else {
            warn!("undo requested for {} before it was placed", self.description());
            return Ok(());
        };

        if world.remove_shop(id).is_none() {
            warn!("shop {id} vanished before undo");
        }
        footprint::refund(world, &claim, self.blueprint.cost)?;
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "place {} at ({}, {})",
            self.blueprint.name,
            self.origin.column(),
            self.origin.row()
        )
    }
}
