use log::warn;
use zoo_tycoon_core::{CellCoord, CellRect, CommandError, HabitatBlueprint, HabitatId};
use zoo_tycoon_world::{Evicted, FootprintClaim, Habitat, World};

use crate::{footprint, Command};

/// Places a habitat with its top-left corner at `origin`.
///
/// Undoing the placement also removes every animal and keeper assigned to the
/// habitat; they are held by the command and return on redo.
#[derive(Debug)]
pub struct PlaceHabitatCommand {
    blueprint: HabitatBlueprint,
    origin: CellCoord,
    habitat: Option<HabitatId>,
    claim: Option<FootprintClaim>,
    evicted: Evicted,
}

impl PlaceHabitatCommand {
    /// Creates a command that has not been executed yet.
    #[must_use]
    pub fn new(blueprint: HabitatBlueprint, origin: CellCoord) -> Self {
        Self {
            blueprint,
            origin,
            habitat: None,
            claim: None,
            evicted: Evicted::default(),
        }
    }

    /// Identifier allocated on first execution.
    #[must_use]
    pub const fn habitat(&self) -> Option<HabitatId> {
        self.habitat
    }

    fn region(&self) -> CellRect {
        CellRect::from_origin_and_size(self.origin, self.blueprint.size)
    }
}

impl Command for PlaceHabitatCommand {
    fn execute(&mut self, world: &mut World) -> Result<(), CommandError> {
        let region = self.region();
        let claim = footprint::purchase(world, region, self.blueprint.cost)?;

        let id = *self
            .habitat
            .get_or_insert_with(|| world.allocate_habitat_id());
        world.insert_habitat(Habitat::new(
            id,
            &self.blueprint.name,
            region,
            self.blueprint.capacity,
        ));
        world.reinstate(std::mem::take(&mut self.evicted));
        self.claim = Some(claim);
        Ok(())
    }

    fn undo(&mut self, world: &mut World) -> Result<(), CommandError> {
        let (Some(id), Some(claim)) = (self.habitat, self.claim.take()) else {
            warn!("undo requested for {} before it was placed", self.description());
            return Ok(());
        };

        match world.remove_habitat(id) {
            Some((_, evicted)) => self.evicted = evicted,
            None => warn!("habitat {id} vanished before undo"),
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
